//! Common error types for Waypost components.

use thiserror::Error;

/// Common errors across Waypost components.
///
/// The three token variants form the verification taxonomy of the
/// challenge engine; their messages are part of the client contract
/// and are rendered verbatim in HTTP error bodies.
#[derive(Debug, Error)]
pub enum WaypostError {
    /// Unknown, already-consumed, or evicted challenge token
    #[error("{0}")]
    TokenNotFound(String),

    /// Known token past its TTL
    #[error("{0}")]
    TokenExpired(String),

    /// Wrong answer for a live token
    #[error("{0}")]
    AnswerMismatch(String),

    /// External collaborator failure (user store, identity provider, mail relay)
    #[error("Upstream service unavailable: {0}")]
    Upstream(String),

    /// Authentication/authorization failure
    #[error("{0}")]
    Auth(String),

    /// Requested entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// Invalid input/request
    #[error("{0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WaypostError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::TokenNotFound(_) => 400,
            Self::TokenExpired(_) => 400,
            Self::AnswerMismatch(_) => 400,
            Self::Upstream(_) => 502,
            Self::Auth(_) => 401,
            Self::NotFound(_) => 404,
            Self::InvalidInput(_) => 400,
            Self::Config(_) => 500,
            Self::Internal(_) => 500,
        }
    }

    /// Returns true if this error came from an external collaborator
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream(_))
    }
}
