use contracts::usecases::common::UseCaseError;
use thiserror::Error;

/// Failures of a sync run.
///
/// `Auth`, `Validation` and `Fetch` abort the run before any record is
/// processed. `Persist` is only ever reported per record.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Persist failed: {0}")]
    Persist(String),
}

impl SyncError {
    /// Classify a transport error; timeouts are fetch failures
    pub fn from_transport(context: &str, e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            SyncError::Fetch(format!("{}: request timed out", context))
        } else if e.is_connect() {
            SyncError::Fetch(format!("{}: connection failed: {}", context, e))
        } else {
            SyncError::Fetch(format!("{}: {}", context, e))
        }
    }
}

impl From<SyncError> for UseCaseError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Auth(msg) => UseCaseError::auth(msg),
            SyncError::Validation(msg) => UseCaseError::validation(msg),
            SyncError::Fetch(msg) => UseCaseError::fetch(msg),
            SyncError::Persist(msg) => UseCaseError::internal(msg),
        }
    }
}
