use crate::models::course::Course;
use crate::models::professor::Professor;
use crate::models::review::Review;
use crate::models::vote::Vote;
use serde::{Deserialize, Serialize};

/// One durable row per (event, subscriber). `course_code`/`professor_id`
/// carry the subscription target that matched; `review_id` names the review
/// the event happened on; `vote_id` is set only for vote events.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Notification {
    pub id: i64,
    pub recipient_id: String,
    pub course_code: Option<i64>,
    pub professor_id: Option<i64>,
    pub review_id: Option<i64>,
    pub vote_id: Option<i64>,
    pub read: bool,
    pub created_at: String, // RFC 3339
}

/// A notification joined with everything the notification panel renders: the
/// review it concerns, that review's course and professor, and the vote.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NotificationFeedItem {
    pub notification: Notification,
    pub review: Option<Review>,
    pub course: Option<Course>,
    pub professor: Option<Professor>,
    pub vote: Option<Vote>,
}
