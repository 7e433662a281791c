use serde::{Deserialize, Serialize};

pub const INGEST_STATUS_OK: &str = "ok";

/// Metadata kept in the document store for one received message.
///
/// `key` doubles as the partition key and, behind the configured prefix, as
/// the object name of the raw message. It is assigned once at ingestion and
/// never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredMessageRecord {
    pub key: String,
    #[serde(rename = "receivedAt")]
    pub received_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

/// One inbound-message notification, independent of the envelope it arrived in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestionEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(
        rename = "receivedAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub received_at: Option<String>,
}

impl IngestionEvent {
    pub fn at_location(location: impl Into<String>) -> Self {
        Self {
            bucket: None,
            location: location.into(),
            sender: None,
            subject: None,
            received_at: None,
        }
    }

    /// Builds the record this event produces, stamping `fallback_received_at`
    /// when the notification carried no timestamp of its own.
    pub fn into_record(self, key: String, fallback_received_at: &str) -> StoredMessageRecord {
        StoredMessageRecord {
            key,
            received_at: self
                .received_at
                .unwrap_or_else(|| fallback_received_at.to_string()),
            sender: self.sender,
            subject: self.subject,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestedRecord {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestSummary {
    pub status: String,
    pub records: Vec<IngestedRecord>,
}
