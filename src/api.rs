use crate::actions;
use crate::db::Database;
use crate::error::AppError;
use crate::models::course::Course;
use crate::models::review::ReviewForm;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{error, info};

#[derive(Serialize, Deserialize)]
pub struct CreateReviewRequest {
    pub user_id: String,
    pub review: ReviewForm,
}

#[derive(Serialize, Deserialize)]
pub struct VoteRequest {
    pub user_id: String,
    pub upvote: bool,
}

#[derive(Serialize, Deserialize)]
pub struct SubscriptionRequest {
    pub user_id: String,
    pub course_code: Option<i64>,
    pub professor_id: Option<i64>,
    pub review_id: Option<i64>,
}

#[derive(Serialize, Deserialize)]
pub struct ProfessorRequest {
    pub first_name: Option<String>,
    pub last_name: String,
}

fn error_response(err: AppError) -> HttpResponse {
    match err {
        AppError::Validation(_) => HttpResponse::BadRequest().body(err.to_string()),
        AppError::NotFound(_) => HttpResponse::NotFound().body(err.to_string()),
        _ => HttpResponse::InternalServerError().body(err.to_string()),
    }
}

pub async fn create_review(
    db: web::Data<Database>,
    request: web::Json<CreateReviewRequest>,
) -> HttpResponse {
    // raw JSON logging
    let raw_json = serde_json::to_string(&*request).unwrap_or_default();
    info!("[API] create review request: {}", raw_json);

    match actions::create_review(&db, &request.review, &request.user_id).await {
        Ok(review) => {
            info!("[API] review {} created", review.id);
            HttpResponse::Ok().json(review)
        }
        Err(err) => {
            error!("[API] failed to create review: {:?}", err);
            error_response(err)
        }
    }
}

pub async fn update_review(
    db: web::Data<Database>,
    review_id: web::Path<i64>,
    form: web::Json<ReviewForm>,
) -> HttpResponse {
    let review_id = review_id.into_inner();
    match actions::update_review(&db, review_id, &form).await {
        Ok(review) => HttpResponse::Ok().json(review),
        Err(err) => {
            error!("[API] failed to update review {}: {:?}", review_id, err);
            error_response(err)
        }
    }
}

pub async fn delete_review(db: web::Data<Database>, review_id: web::Path<i64>) -> HttpResponse {
    let review_id = review_id.into_inner();
    match actions::delete_review(&db, review_id).await {
        Ok(review) => HttpResponse::Ok().json(review),
        Err(err) => {
            error!("[API] failed to delete review {}: {:?}", review_id, err);
            error_response(err)
        }
    }
}

pub async fn vote_review(
    db: web::Data<Database>,
    review_id: web::Path<i64>,
    request: web::Json<VoteRequest>,
) -> HttpResponse {
    let review_id = review_id.into_inner();
    match actions::vote(&db, &request.user_id, review_id, request.upvote).await {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(err) => {
            error!("[API] failed to vote on review {}: {:?}", review_id, err);
            error_response(err)
        }
    }
}

pub async fn get_reviews_by_course(
    db: web::Data<Database>,
    course_code: web::Path<i64>,
) -> HttpResponse {
    match db.get_reviews_by_course(course_code.into_inner()).await {
        Ok(reviews) => HttpResponse::Ok().json(reviews),
        Err(err) => {
            error!("[API] failed to fetch reviews: {:?}", err);
            error_response(err)
        }
    }
}

pub async fn get_notifications(
    db: web::Data<Database>,
    query: web::Query<HashMap<String, String>>,
) -> HttpResponse {
    let user_id = match query.get("user_id") {
        Some(user_id) if !user_id.is_empty() => user_id.clone(),
        _ => {
            return error_response(AppError::Validation(
                "must provide a user_id to fetch notifications".into(),
            ))
        }
    };
    match actions::get_notifications(&db, &user_id).await {
        Ok(feed) => {
            info!(
                "[API] returning {} notifications for user {}",
                feed.len(),
                user_id
            );
            HttpResponse::Ok().json(feed)
        }
        Err(err) => {
            error!("[API] failed to fetch notifications: {:?}", err);
            error_response(err)
        }
    }
}

pub async fn mark_notification_read(
    db: web::Data<Database>,
    notification_id: web::Path<i64>,
) -> HttpResponse {
    let notification_id = notification_id.into_inner();
    match db.mark_notification_read(notification_id).await {
        Ok(()) => HttpResponse::Ok().body("Notification marked read"),
        Err(err) => {
            error!(
                "[API] failed to mark notification {} read: {:?}",
                notification_id, err
            );
            error_response(err)
        }
    }
}

pub async fn get_subscriptions(
    db: web::Data<Database>,
    query: web::Query<HashMap<String, String>>,
) -> HttpResponse {
    let user_id = match query.get("user_id") {
        Some(user_id) if !user_id.is_empty() => user_id.clone(),
        _ => {
            return error_response(AppError::Validation(
                "must provide a user_id to fetch subscriptions".into(),
            ))
        }
    };
    match db.find_subscriptions_by_user(&user_id).await {
        Ok(subscriptions) => HttpResponse::Ok().json(subscriptions),
        Err(err) => {
            error!("[API] failed to fetch subscriptions: {:?}", err);
            error_response(err)
        }
    }
}

pub async fn create_subscription(
    db: web::Data<Database>,
    request: web::Json<SubscriptionRequest>,
) -> HttpResponse {
    match db
        .create_subscription(
            &request.user_id,
            request.course_code,
            request.professor_id,
            request.review_id,
        )
        .await
    {
        Ok(subscription) => HttpResponse::Ok().json(subscription),
        Err(err) => {
            error!("[API] failed to create subscription: {:?}", err);
            error_response(err)
        }
    }
}

pub async fn delete_subscription(
    db: web::Data<Database>,
    subscription_id: web::Path<i64>,
) -> HttpResponse {
    let subscription_id = subscription_id.into_inner();
    match db.delete_subscription(subscription_id).await {
        Ok(()) => HttpResponse::Ok().body("Subscription deleted"),
        Err(err) => {
            error!(
                "[API] failed to delete subscription {}: {:?}",
                subscription_id, err
            );
            error_response(err)
        }
    }
}

pub async fn get_courses(db: web::Data<Database>) -> HttpResponse {
    match db.get_courses().await {
        Ok(courses) => HttpResponse::Ok().json(courses),
        Err(err) => {
            error!("[API] failed to fetch courses: {:?}", err);
            error_response(err)
        }
    }
}

pub async fn create_course(db: web::Data<Database>, course: web::Json<Course>) -> HttpResponse {
    match db.insert_course(course.code, &course.name).await {
        Ok(course) => HttpResponse::Ok().json(course),
        Err(err) => {
            error!("[API] failed to create course: {:?}", err);
            error_response(err)
        }
    }
}

pub async fn get_professors(db: web::Data<Database>) -> HttpResponse {
    match db.get_professors().await {
        Ok(professors) => HttpResponse::Ok().json(professors),
        Err(err) => {
            error!("[API] failed to fetch professors: {:?}", err);
            error_response(err)
        }
    }
}

pub async fn create_professor(
    db: web::Data<Database>,
    request: web::Json<ProfessorRequest>,
) -> HttpResponse {
    match db
        .insert_professor(request.first_name.as_deref(), &request.last_name)
        .await
    {
        Ok(professor) => HttpResponse::Ok().json(professor),
        Err(err) => {
            error!("[API] failed to create professor: {:?}", err);
            error_response(err)
        }
    }
}
