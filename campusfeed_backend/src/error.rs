use thiserror::Error;

/// Domain error taxonomy shared by every service.
///
/// `ModerationRejected` is a terminal content decision, never retried;
/// `Upstream` covers oracle transport failures and timeouts, which callers
/// may retry. `Internal` wraps storage or invariant failures and is logged
/// at the HTTP boundary without exposing detail.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    ModerationRejected(String),
    #[error("upstream service unavailable: {0}")]
    Upstream(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}
