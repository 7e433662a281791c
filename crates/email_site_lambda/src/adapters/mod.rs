use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use thiserror::Error;

use crate::runtime::error::MailError;

pub mod document_store;
pub mod object_store;

/// Service error codes that signal a transient condition worth retrying.
const RETRYABLE_CODES: &[&str] = &[
    "ThrottlingException",
    "ProvisionedThroughputExceededException",
    "RequestLimitExceeded",
    "SlowDown",
    "ServiceUnavailable",
    "InternalServerError",
];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{operation} unavailable: {message}")]
    Unavailable {
        operation: &'static str,
        message: String,
    },

    #[error("{operation} failed: {message}")]
    Failed {
        operation: &'static str,
        message: String,
    },

    #[error("stored item '{key}' is malformed: {message}")]
    CorruptItem { key: String, message: String },

    #[error("object exceeds the {limit} byte limit")]
    TooLarge { limit: u64 },
}

impl From<StoreError> for MailError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::TooLarge { limit } => MailError::PayloadTooLarge { limit },
            StoreError::Unavailable { .. } => MailError::dependency(error.to_string(), true),
            StoreError::Failed { .. } | StoreError::CorruptItem { .. } => {
                MailError::dependency(error.to_string(), false)
            }
        }
    }
}

pub(crate) fn classify_sdk_error<E, R>(operation: &'static str, error: SdkError<E, R>) -> StoreError
where
    E: std::error::Error + ProvideErrorMetadata + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    let retryable = match &error {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => true,
        SdkError::ServiceError(_) => error
            .as_service_error()
            .and_then(|service| service.code())
            .is_some_and(|code| RETRYABLE_CODES.contains(&code)),
        _ => false,
    };

    let message = DisplayErrorContext(&error).to_string();
    if retryable {
        StoreError::Unavailable { operation, message }
    } else {
        StoreError::Failed { operation, message }
    }
}
