use serde_json::Value;
use tracing::{error, info};

use crate::adapters::document_store::RecordStore;
use crate::config::RuntimeConfig;
use crate::runtime::contract::{IngestSummary, IngestedRecord, IngestionEvent, INGEST_STATUS_OK};
use crate::runtime::error::MailError;
use crate::runtime::events::decode_ingestion_events;
use crate::runtime::keys::{public_url_for, record_key_from_object_key};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    pub email_bucket_name: String,
    pub email_key_prefix: String,
    pub public_url: Option<String>,
    /// Stamped as `receivedAt` when a notification carries no timestamp.
    pub event_time: String,
}

impl IngestConfig {
    pub fn from_runtime(config: &RuntimeConfig, event_time: impl Into<String>) -> Self {
        Self {
            email_bucket_name: config.email_bucket_name.clone(),
            email_key_prefix: config.email_key_prefix.clone(),
            public_url: config.public_url.clone(),
            event_time: event_time.into(),
        }
    }
}

/// Records every message referenced by an inbound notification.
///
/// Each write is an upsert keyed by the message key, so redelivering the same
/// notification leaves a single record holding the latest payload. The first
/// failing message fails the whole invocation; the error must reach the
/// delivery layer so it can redeliver or dead-letter the batch.
pub fn handle_ingestion_event(
    event: &Value,
    config: &IngestConfig,
    store: &impl RecordStore,
) -> Result<IngestSummary, MailError> {
    let result = ingest_batch(event, config, store);
    if let Err(failure) = &result {
        error!(
            component = "ingest_handler",
            event = "ingest_failed",
            error_code = failure.error_code(),
            error = %failure,
        );
    }
    result
}

fn ingest_batch(
    event: &Value,
    config: &IngestConfig,
    store: &impl RecordStore,
) -> Result<IngestSummary, MailError> {
    let events = decode_ingestion_events(event)?;
    info!(
        component = "ingest_handler",
        event = "batch_received",
        messages = events.len(),
    );

    let mut records = Vec::with_capacity(events.len());
    for ingestion_event in events {
        records.push(ingest_message(ingestion_event, config, store)?);
    }

    Ok(IngestSummary {
        status: INGEST_STATUS_OK.to_string(),
        records,
    })
}

fn ingest_message(
    event: IngestionEvent,
    config: &IngestConfig,
    store: &impl RecordStore,
) -> Result<IngestedRecord, MailError> {
    if let Some(bucket) = &event.bucket {
        if bucket != &config.email_bucket_name {
            return Err(MailError::validation(format!(
                "message stored in bucket '{bucket}', expected '{}'",
                config.email_bucket_name
            )));
        }
    }

    let key = record_key_from_object_key(&event.location, &config.email_key_prefix)?;
    let record = event.into_record(key, &config.event_time);
    store.put_record(&record)?;

    info!(
        component = "ingest_handler",
        event = "record_stored",
        key = %record.key,
        sender = record.sender.as_deref().unwrap_or("unknown"),
        received_at = %record.received_at,
    );

    let url = config
        .public_url
        .as_deref()
        .map(|base_url| public_url_for(base_url, &record.key));
    Ok(IngestedRecord {
        key: record.key,
        url,
    })
}
