use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MailError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    Dependency { message: String, retryable: bool },

    #[error("stored message exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: u64 },
}

impl MailError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn dependency(message: impl Into<String>, retryable: bool) -> Self {
        Self::Dependency {
            message: message.into(),
            retryable,
        }
    }

    /// HTTP status the retrieval surface answers with for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::PayloadTooLarge { .. } => 413,
            Self::Dependency {
                retryable: true, ..
            } => 503,
            Self::Dependency {
                retryable: false, ..
            } => 502,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
            Self::Dependency { .. } => "dependency_error",
            Self::PayloadTooLarge { .. } => "payload_too_large",
        }
    }
}

pub type Result<T> = std::result::Result<T, MailError>;
