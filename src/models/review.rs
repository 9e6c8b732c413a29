// src/models/review.rs
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Review {
    pub id: i64,
    pub user_id: String,           // ID of the user who submitted the review
    pub course_code: i64,          // Code of the course being reviewed
    pub professor_id: Option<i64>, // None when the professor name matched no record
    pub year: i64,
    pub semester: i64,
    pub title: String,
    pub content: String,
    pub rating: i64,
    pub difficulty_rating: i64,
    pub workload: i64,
    pub professor_quality_rating: i64,
    pub professor_difficulty_rating: i64,
    pub lecture_rating: i64,
    pub created_at: String,    // RFC 3339
    pub last_modified: String, // RFC 3339
}

/// Raw review form input. Numeric fields arrive as strings straight from the
/// form and are coerced by the action layer.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ReviewForm {
    pub course: String,    // e.g. "101 Intro to CS"; the leading token is the course code
    pub professor: String, // display name, e.g. "Jane Smith"
    pub year: String,
    pub term: String,
    pub title: String,
    pub content: String,
    pub course_rating: String,
    pub course_difficulty_rating: String,
    pub course_workload: String,
    pub professor_rating: String,
    pub professor_difficulty_rating: String,
    pub lecture_rating: String,
}

/// Validated field set written by an insert, minus the ids and timestamps the
/// store fills in itself.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub user_id: String,
    pub course_code: i64,
    pub professor_id: Option<i64>,
    pub year: i64,
    pub semester: i64,
    pub title: String,
    pub content: String,
    pub rating: i64,
    pub difficulty_rating: i64,
    pub workload: i64,
    pub professor_quality_rating: i64,
    pub professor_difficulty_rating: i64,
    pub lecture_rating: i64,
}

/// The fields an edit may change. `last_modified` is stamped by the store in
/// the same write.
#[derive(Debug, Clone)]
pub struct ReviewUpdate {
    pub title: String,
    pub content: String,
    pub rating: i64,
    pub difficulty_rating: i64,
    pub workload: i64,
    pub professor_quality_rating: i64,
    pub professor_difficulty_rating: i64,
    pub lecture_rating: i64,
}
