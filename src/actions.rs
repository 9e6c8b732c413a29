//! Review action layer: orchestrates review creation, edits, votes, and
//! deletion. Coerces raw form input, resolves the professor, writes through
//! the store, auto-subscribes the author, and kicks off fan-out.
//!
//! Errors propagate to the caller as-is; there is no retry and no rollback of
//! steps already committed.

use crate::db::Database;
use crate::error::AppError;
use crate::models::notification::NotificationFeedItem;
use crate::models::review::{NewReview, Review, ReviewForm, ReviewUpdate};
use crate::models::vote::VoteResult;
use crate::notify;
use tracing::info;

/// Splits a professor display name into (first, last), uppercased for the
/// store lookup. One token is a bare last name; tokens past the second are
/// silently dropped, matching the review form's behavior.
fn split_professor_name(name: &str) -> (Option<String>, Option<String>) {
    let mut tokens = name.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some(last), None) => (None, Some(last.to_uppercase())),
        (Some(first), Some(last)) => (Some(first.to_uppercase()), Some(last.to_uppercase())),
        _ => (None, None),
    }
}

/// The course field reads like "101 Intro to CS"; the leading token is the
/// course code.
fn parse_course_code(course: &str) -> Result<i64, AppError> {
    course
        .split_whitespace()
        .next()
        .and_then(|token| token.parse().ok())
        .ok_or_else(|| {
            AppError::Validation(format!(
                "course '{}' does not start with a numeric code",
                course
            ))
        })
}

fn parse_number(field: &str, value: &str) -> Result<i64, AppError> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::Validation(format!("{} '{}' is not a number", field, value)))
}

/// Ratings share one fixed scale across the form.
const RATING_SCALE: i64 = 5;

fn parse_rating(field: &str, value: &str) -> Result<i64, AppError> {
    let rating = parse_number(field, value)?;
    if !(1..=RATING_SCALE).contains(&rating) {
        return Err(AppError::Validation(format!(
            "{} must be between 1 and {}, got {}",
            field, RATING_SCALE, rating
        )));
    }
    Ok(rating)
}

/// Workload is a weekly-hours count, positive but not bound to the rating
/// scale.
fn parse_workload(field: &str, value: &str) -> Result<i64, AppError> {
    let workload = parse_number(field, value)?;
    if workload < 1 {
        return Err(AppError::Validation(format!(
            "{} must be positive, got {}",
            field, workload
        )));
    }
    Ok(workload)
}

/// Creates a review from raw form input, subscribes the author to it, and
/// fans out to course subscribers, then professor subscribers. The professor
/// fan-out only fires when the display name resolved to a record; an
/// unmatched name leaves the review without a professor rather than carrying
/// a sentinel id.
pub async fn create_review(
    db: &Database,
    form: &ReviewForm,
    user_id: &str,
) -> Result<Review, AppError> {
    let (first_name, last_name) = split_professor_name(&form.professor);
    let professor = match &last_name {
        Some(last) => db.find_professor_by_name(first_name.as_deref(), last).await?,
        None => None,
    };
    let professor_id = professor.map(|p| p.id);
    let course_code = parse_course_code(&form.course)?;

    let review = db
        .insert_review(&NewReview {
            user_id: user_id.to_string(),
            course_code,
            professor_id,
            year: parse_number("year", &form.year)?,
            semester: parse_number("term", &form.term)?,
            title: form.title.clone(),
            content: form.content.clone(),
            rating: parse_rating("course rating", &form.course_rating)?,
            difficulty_rating: parse_rating(
                "course difficulty rating",
                &form.course_difficulty_rating,
            )?,
            workload: parse_workload("course workload", &form.course_workload)?,
            professor_quality_rating: parse_rating("professor rating", &form.professor_rating)?,
            professor_difficulty_rating: parse_rating(
                "professor difficulty rating",
                &form.professor_difficulty_rating,
            )?,
            lecture_rating: parse_rating("lecture rating", &form.lecture_rating)?,
        })
        .await?;

    // Authors follow their own reviews
    db.create_subscription(user_id, None, None, Some(review.id))
        .await?;

    notify::notify_course_review_created(db, course_code, review.id).await?;
    if let Some(professor_id) = professor_id {
        notify::notify_professor_review_created(db, professor_id, review.id).await?;
    }

    Ok(review)
}

/// Overwrites the editable fields; the store stamps `last_modified` in the
/// same write.
pub async fn update_review(
    db: &Database,
    review_id: i64,
    form: &ReviewForm,
) -> Result<Review, AppError> {
    db.update_review(
        review_id,
        &ReviewUpdate {
            title: form.title.clone(),
            content: form.content.clone(),
            rating: parse_rating("course rating", &form.course_rating)?,
            difficulty_rating: parse_rating(
                "course difficulty rating",
                &form.course_difficulty_rating,
            )?,
            workload: parse_workload("course workload", &form.course_workload)?,
            professor_quality_rating: parse_rating("professor rating", &form.professor_rating)?,
            professor_difficulty_rating: parse_rating(
                "professor difficulty rating",
                &form.professor_difficulty_rating,
            )?,
            lecture_rating: parse_rating("lecture rating", &form.lecture_rating)?,
        },
    )
    .await
}

/// Applies a vote and fans out to the review's subscribers. Voting twice in
/// the same direction retracts the vote; voting the other way flips it, which
/// withdraws the stale notifications before announcing the new vote.
pub async fn vote(
    db: &Database,
    user_id: &str,
    review_id: i64,
    upvote: bool,
) -> Result<VoteResult, AppError> {
    match db.find_vote(user_id, review_id).await? {
        None => {
            let vote = db.insert_vote(user_id, review_id, upvote).await?;
            notify::notify_review_voted(db, review_id, vote.id).await?;
            Ok(VoteResult::Cast(vote))
        }
        Some(existing) if existing.upvote == upvote => {
            notify::notify_review_vote_removed(db, review_id, existing.id).await?;
            db.delete_vote(existing.id).await?;
            info!("user {} retracted vote on review {}", user_id, review_id);
            Ok(VoteResult::Removed(existing))
        }
        Some(existing) => {
            notify::notify_review_vote_removed(db, review_id, existing.id).await?;
            let flipped = db.set_vote_flag(existing.id, upvote).await?;
            notify::notify_review_voted(db, review_id, flipped.id).await?;
            Ok(VoteResult::Changed(flipped))
        }
    }
}

/// Deletes the review and returns it; referencing votes, subscriptions and
/// notifications are cleaned up by the store's cascades.
pub async fn delete_review(db: &Database, review_id: i64) -> Result<Review, AppError> {
    db.delete_review(review_id).await
}

pub async fn get_notifications(
    db: &Database,
    user_id: &str,
) -> Result<Vec<NotificationFeedItem>, AppError> {
    db.find_notifications_by_recipient(user_id).await
}
