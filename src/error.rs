//! Failure taxonomy for credential lifecycle and admin actions.

use thiserror::Error;

/// Named failures reported back to the caller of an admin action.
///
/// None of these are fatal; the triggering control is re-enabled and the
/// user decides whether to retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClawError {
    #[error("An {0} Application Password already exists. Revoke it first before creating a new one.")]
    AlreadyExists(String),

    #[error("No {0} Application Password found to revoke.")]
    NotFound(String),

    #[error("You do not have permission to do this.")]
    PermissionDenied,

    #[error("The link you followed has expired.")]
    Unauthenticated,

    #[error("Host storage error: {0}")]
    HostStorage(String),
}

pub type ClawResult<T> = Result<T, ClawError>;

impl ClawError {
    /// Stable machine-readable code for structured responses.
    pub fn code(&self) -> &'static str {
        match self {
            ClawError::AlreadyExists(_) => "clawpress_exists",
            ClawError::NotFound(_) => "clawpress_not_found",
            ClawError::PermissionDenied => "clawpress_forbidden",
            ClawError::Unauthenticated => "clawpress_bad_nonce",
            ClawError::HostStorage(_) => "clawpress_host_error",
        }
    }

    pub fn host(err: impl std::fmt::Display) -> Self {
        ClawError::HostStorage(err.to_string())
    }
}

impl From<anyhow::Error> for ClawError {
    fn from(err: anyhow::Error) -> Self {
        ClawError::HostStorage(format!("{:#}", err))
    }
}
