// Typed errors raised by reminder stores and the write path.
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Access to reminders was denied")]
    AccessDenied,
    #[error("Access to reminders is restricted on this device")]
    AccessRestricted,
    #[error("Reminder access status is unknown")]
    AccessUnknown,
    #[error("List not found: {0}")]
    ListNotFound(String),
    #[error("No default list is configured for new reminders")]
    NoDefaultList,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Store operation failed: {0}")]
    StoreOperationFailed(String),
    #[error("Store did not answer within {0:?}")]
    TimedOut(Duration),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// True for the authorization family of failures.
    pub fn is_access_error(&self) -> bool {
        matches!(
            self,
            Self::AccessDenied | Self::AccessRestricted | Self::AccessUnknown
        )
    }
}

impl From<anyhow::Error> for StoreError {
    fn from(e: anyhow::Error) -> Self {
        Self::StoreOperationFailed(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
