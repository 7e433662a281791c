use serde_json::Value;
use thiserror::Error;

use crate::adapters::document_store::RecordStore;
use crate::adapters::object_store::BlobStore;
use crate::runtime::error::MailError;

use self::ingest::{handle_ingestion_event, IngestConfig};
use self::retrieve::{handle_retrieval_event, RetrieveConfig};

pub mod ingest;
pub mod retrieve;

#[cfg(test)]
pub(crate) mod test_support;

/// Which handler a raw Lambda payload belongs to. One binary backs both the
/// mail-processing function and the HTTP function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invocation {
    Ingestion,
    Retrieval,
}

/// Failures that must reach the invoking platform as a failed invocation.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("ingestion failed ({code}): {0}", code = .0.error_code())]
    Ingestion(MailError),

    #[error("failed to serialize response: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Only payloads carrying an HTTP request marker are retrievals. Everything
/// else goes to ingestion, where a malformed notification fails loudly.
pub fn classify_invocation(event: &Value) -> Invocation {
    let has_string = |name: &str| event.get(name).is_some_and(Value::is_string);
    let has_http_context = event
        .get("requestContext")
        .and_then(|context| context.get("http"))
        .is_some();

    if has_string("httpMethod") || has_string("path") || has_string("rawPath") || has_http_context
    {
        Invocation::Retrieval
    } else {
        Invocation::Ingestion
    }
}

/// Runs the handler the payload belongs to. Retrieval always answers with an
/// HTTP response; ingestion failures come back as `Err` so the delivery layer
/// redelivers or dead-letters the notification.
pub fn handle_invocation(
    event: &Value,
    ingest_config: &IngestConfig,
    retrieve_config: &RetrieveConfig,
    records: &impl RecordStore,
    blobs: &impl BlobStore,
) -> Result<Value, InvocationError> {
    match classify_invocation(event) {
        Invocation::Ingestion => {
            let summary = handle_ingestion_event(event, ingest_config, records)
                .map_err(InvocationError::Ingestion)?;
            Ok(serde_json::to_value(summary)?)
        }
        Invocation::Retrieval => {
            let response = handle_retrieval_event(event, retrieve_config, records, blobs);
            Ok(serde_json::to_value(response)?)
        }
    }
}
