use serde::{Deserialize, Serialize};

/// Names are stored uppercased; lookups from parsed display names uppercase
/// both sides, so matching is effectively case-insensitive.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Professor {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: String,
}
