//! Fan-out engine: translates a domain event into one notification write per
//! matching subscriber.
//!
//! Fan-out is push-on-write. Each subscriber gets a durable row so unread
//! state can be tracked per recipient. Delivery is sequential and
//! at-least-once: a failing subscriber is logged and skipped, earlier writes
//! stay committed, and the aggregate failure is reported at the end.

use crate::db::Database;
use crate::error::AppError;
use tracing::{info, warn};

/// Notifies everyone subscribed to `course_code` that a review was posted
/// under it. Returns the number of notifications written.
pub async fn notify_course_review_created(
    db: &Database,
    course_code: i64,
    review_id: i64,
) -> Result<usize, AppError> {
    let subscribers = db.find_subscriptions_by_course(course_code).await?;
    if subscribers.is_empty() {
        return Ok(0);
    }

    let mut failed = Vec::new();
    for subscriber in &subscribers {
        if let Err(err) = db
            .create_notification(
                &subscriber.user_id,
                Some(course_code),
                None,
                Some(review_id),
                None,
            )
            .await
        {
            warn!(
                "failed to notify {} of review {} on course {}: {}",
                subscriber.user_id, review_id, course_code, err
            );
            failed.push(subscriber.user_id.clone());
        }
    }

    finish_fan_out(subscribers.len(), failed)
}

/// Notifies everyone subscribed to `professor_id` that a review mentioning
/// that professor was posted.
pub async fn notify_professor_review_created(
    db: &Database,
    professor_id: i64,
    review_id: i64,
) -> Result<usize, AppError> {
    let subscribers = db.find_subscriptions_by_professor(professor_id).await?;
    if subscribers.is_empty() {
        return Ok(0);
    }

    let mut failed = Vec::new();
    for subscriber in &subscribers {
        if let Err(err) = db
            .create_notification(
                &subscriber.user_id,
                None,
                Some(professor_id),
                Some(review_id),
                None,
            )
            .await
        {
            warn!(
                "failed to notify {} of review {} on professor {}: {}",
                subscriber.user_id, review_id, professor_id, err
            );
            failed.push(subscriber.user_id.clone());
        }
    }

    finish_fan_out(subscribers.len(), failed)
}

/// Notifies everyone subscribed to `review_id` that a vote landed on it.
pub async fn notify_review_voted(
    db: &Database,
    review_id: i64,
    vote_id: i64,
) -> Result<usize, AppError> {
    let subscribers = db.find_subscriptions_by_review(review_id).await?;
    if subscribers.is_empty() {
        return Ok(0);
    }

    let mut failed = Vec::new();
    for subscriber in &subscribers {
        if let Err(err) = db
            .create_notification(
                &subscriber.user_id,
                None,
                None,
                Some(review_id),
                Some(vote_id),
            )
            .await
        {
            warn!(
                "failed to notify {} of vote {} on review {}: {}",
                subscriber.user_id, vote_id, review_id, err
            );
            failed.push(subscriber.user_id.clone());
        }
    }

    finish_fan_out(subscribers.len(), failed)
}

/// Removes the notifications created for a vote that has been retracted.
/// Subscribers without a matching notification are left untouched.
pub async fn notify_review_vote_removed(
    db: &Database,
    review_id: i64,
    vote_id: i64,
) -> Result<usize, AppError> {
    let subscribers = db.find_subscriptions_by_review(review_id).await?;
    if subscribers.is_empty() {
        return Ok(0);
    }

    let mut failed = Vec::new();
    for subscriber in &subscribers {
        let result = async {
            if let Some(notification) = db
                .find_notification_by_vote(&subscriber.user_id, vote_id)
                .await?
            {
                db.delete_notification(notification.id).await?;
            }
            Ok::<(), AppError>(())
        }
        .await;

        if let Err(err) = result {
            warn!(
                "failed to withdraw vote {} notification for {}: {}",
                vote_id, subscriber.user_id, err
            );
            failed.push(subscriber.user_id.clone());
        }
    }

    finish_fan_out(subscribers.len(), failed)
}

fn finish_fan_out(attempted: usize, failed: Vec<String>) -> Result<usize, AppError> {
    let delivered = attempted - failed.len();
    if failed.is_empty() {
        info!("fan-out delivered {} notifications", delivered);
        Ok(delivered)
    } else {
        Err(AppError::FanOut {
            attempted,
            delivered,
            failed,
        })
    }
}
