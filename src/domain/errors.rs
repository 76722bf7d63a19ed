use thiserror::Error;

use crate::messaging::ChannelError;

/// Failure taxonomy shared by every request chain.
///
/// A chain step that fails short-circuits the rest of its chain; the HTTP
/// boundary translates the variant into a status code and the inner cause
/// text into the error body, verbatim.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("invalid credential: {0}")]
    InvalidCredential(String),
    #[error("user not found: {0}")]
    UserNotFound(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("no handler bound to address '{0}'")]
    Unroutable(String),
    #[error("{0}")]
    HandlerFailure(String),
    #[error("{0}")]
    Timeout(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl FlowError {
    pub fn invalid_credential(message: impl Into<String>) -> Self {
        Self::InvalidCredential(message.into())
    }

    pub fn user_not_found(message: impl Into<String>) -> Self {
        Self::UserNotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// The bare cause text, without the variant prefix added by `Display`.
    pub fn cause(&self) -> &str {
        match self {
            Self::InvalidCredential(cause)
            | Self::UserNotFound(cause)
            | Self::Forbidden(cause)
            | Self::Validation(cause)
            | Self::Unroutable(cause)
            | Self::HandlerFailure(cause)
            | Self::Timeout(cause)
            | Self::Internal(cause) => cause,
        }
    }
}

impl From<ChannelError> for FlowError {
    fn from(error: ChannelError) -> Self {
        match error {
            ChannelError::Unroutable(address) => Self::Unroutable(address),
            ChannelError::HandlerFailure(reason) => Self::HandlerFailure(reason),
            timeout @ ChannelError::Timeout { .. } => Self::Timeout(timeout.to_string()),
        }
    }
}

impl From<serde_json::Error> for FlowError {
    fn from(error: serde_json::Error) -> Self {
        Self::Internal(format!("payload (de)serialization failed: {error}"))
    }
}
