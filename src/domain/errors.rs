use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Operation not allowed: {0}")]
    Forbidden(String),
    #[error(transparent)]
    Broadcast(#[from] BroadcastError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Admission-time failures of a broadcast. Per-recipient delivery errors
/// never surface here; they end up in the report instead.
#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("broadcast text is empty")]
    EmptyPayload,
    #[error("another broadcast is already in progress")]
    BroadcastInProgress,
    #[error("failed to read recipients: {0}")]
    Store(#[source] anyhow::Error),
}
