//! Error taxonomy for the remote-sync half of the system.
//!
//! ERROR HANDLING
//! ==============
//! Local state transitions never fail; only remote calls can. Failures are
//! classified into structured variants here — the sync tracker branches on
//! the variant (never on message substrings) to decide whether a failure
//! warrants a full-state refetch.

use uuid::Uuid;

/// Grepable error code and retryable flag for structured failures.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// Failure modes of the external board API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Network-level failure: connect, timeout, or body decode.
    #[error("transport error: {0}")]
    Transport(String),
    /// The server rejected a position write as conflicting (HTTP 409).
    /// Canonical state has drifted; a refetch is warranted.
    #[error("position constraint rejected for {entity_id}")]
    Constraint { entity_id: Uuid },
    /// The entity no longer exists on the server (HTTP 404).
    #[error("entity not found: {0}")]
    NotFound(Uuid),
    /// Any other non-success HTTP status.
    #[error("server returned status {status}")]
    Status { status: u16 },
}

impl ErrorCode for ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "E_TRANSPORT",
            Self::Constraint { .. } => "E_CONSTRAINT",
            Self::NotFound(_) => "E_NOT_FOUND",
            Self::Status { .. } => "E_STATUS",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status } => *status >= 500,
            Self::Constraint { .. } | Self::NotFound(_) => false,
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
