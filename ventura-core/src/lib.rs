pub mod payment;
pub mod repository;
pub mod supplier;

/// Shown when a failure has no message fit for a guest (transport errors).
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Network request failed: {0}")]
    Transport(String),
    #[error("{message}")]
    Api {
        status: Option<u16>,
        message: String,
    },
    #[error("Availability configuration is invalid: {0}")]
    ConfigurationInvalid(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    PaymentDeclined(String),
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Internal service error: {0}")]
    InternalError(String),
}

impl CoreError {
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            status: None,
            message: message.into(),
        }
    }

    /// Text to surface to the guest. Structured errors pass through verbatim,
    /// transport failures collapse into a generic message.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(_) | Self::InternalError(_) => GENERIC_FAILURE_MESSAGE.to_string(),
            Self::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
