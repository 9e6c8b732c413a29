use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Course {
    pub code: i64,    // e.g. 101
    pub name: String, // e.g. "Intro to CS"
}
