use serde::{Deserialize, Serialize};

/// A user's standing interest in one entity. Exactly one of the three target
/// fields is set; the store rejects anything else at creation.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Subscription {
    pub id: i64,
    pub user_id: String,
    pub course_code: Option<i64>,
    pub professor_id: Option<i64>,
    pub review_id: Option<i64>,
}
