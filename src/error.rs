use thiserror::Error;

/// Errors surfaced by the stores, the fan-out engine, and the action layer.
/// Nothing here is retried or rolled back; callers see the failure as-is and
/// any writes committed before it stay committed.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("creation error: {0}")]
    Creation(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Fan-out kept going past per-subscriber failures; this reports the
    /// recipients that were not written. Delivered notifications remain.
    #[error("fan-out delivered {delivered} of {attempted} notifications (failed recipients: {failed:?})")]
    FanOut {
        attempted: usize,
        delivered: usize,
        failed: Vec<String>,
    },

    #[error(transparent)]
    Database(#[from] rusqlite::Error),
}
