//! Error types for the sync layer.

use clinic_storage::StorageError;
use std::fmt;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur in sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The server could not be reached (DNS, connect, timeout, reset).
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with an unexpected non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The access token was rejected.
    #[error("unauthenticated")]
    Unauthenticated,

    /// The server failed with a 5xx status.
    #[error("server error {status}: {body}")]
    Server { status: u16, body: String },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Local storage error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Protocol error (response body not shaped as expected).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A blocking storage task panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(String),

    /// Several independent steps failed (push and pull of one sync).
    #[error("{}", join_errors(.0))]
    Multiple(Vec<SyncError>),
}

fn join_errors(errors: &[SyncError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// What a failed sync means for the user, independent of where it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolvedError {
    /// Offline or the server is unreachable. Retried on the next cycle.
    NetworkRelated,
    /// The user has to log in again.
    Unauthenticated,
    /// The server is failing.
    ServerError,
    /// Anything else. Always a bug somewhere.
    Unexpected,
}

impl ResolvedError {
    /// Whether this error should be reported at `error` level.
    pub const fn is_severe(&self) -> bool {
        matches!(self, ResolvedError::ServerError | ResolvedError::Unexpected)
    }
}

impl fmt::Display for ResolvedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ResolvedError::NetworkRelated => "network unavailable",
            ResolvedError::Unauthenticated => "unauthenticated",
            ResolvedError::ServerError => "server error",
            ResolvedError::Unexpected => "unexpected error",
        };
        f.pad(text)
    }
}

impl SyncError {
    /// Classifies the error. A combined error resolves like its first part,
    /// except that an authentication failure anywhere takes precedence.
    pub fn resolve(&self) -> ResolvedError {
        match self {
            SyncError::Network(_) => ResolvedError::NetworkRelated,
            SyncError::Unauthenticated => ResolvedError::Unauthenticated,
            SyncError::Server { .. } => ResolvedError::ServerError,
            SyncError::Multiple(errors) => {
                let resolved: Vec<_> = errors.iter().map(SyncError::resolve).collect();
                if resolved.contains(&ResolvedError::Unauthenticated) {
                    ResolvedError::Unauthenticated
                } else {
                    resolved.first().copied().unwrap_or(ResolvedError::Unexpected)
                }
            }
            SyncError::Http { .. }
            | SyncError::Serialization(_)
            | SyncError::Storage(_)
            | SyncError::Protocol(_)
            | SyncError::Config(_)
            | SyncError::Task(_) => ResolvedError::Unexpected,
        }
    }

    /// Folds a list of failures into one error. `None` when the list is empty.
    pub fn combine(mut errors: Vec<SyncError>) -> Option<SyncError> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(SyncError::Multiple(errors)),
        }
    }
}

impl From<tokio::task::JoinError> for SyncError {
    fn from(err: tokio::task::JoinError) -> Self {
        SyncError::Task(err.to_string())
    }
}
