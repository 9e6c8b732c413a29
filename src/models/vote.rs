use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Vote {
    pub id: i64,
    pub review_id: i64,
    pub user_id: String, // ID of the user who cast the vote
    pub upvote: bool,
}

/// Outcome of a vote action: a fresh vote, a flipped vote, or a retraction.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "outcome", content = "vote", rename_all = "snake_case")]
pub enum VoteResult {
    Cast(Vote),
    Changed(Vote),
    Removed(Vote),
}
