use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;

use super::{classify_sdk_error, StoreError};
use crate::runtime::contract::StoredMessageRecord;

pub const KEY_ATTRIBUTE: &str = "key";
pub const RECEIVED_AT_ATTRIBUTE: &str = "receivedAt";
pub const SENDER_ATTRIBUTE: &str = "sender";
pub const SUBJECT_ATTRIBUTE: &str = "subject";

pub trait RecordStore {
    /// Writes the record, replacing any previous record with the same key.
    fn put_record(&self, record: &StoredMessageRecord) -> Result<(), StoreError>;

    fn get_record(&self, key: &str) -> Result<Option<StoredMessageRecord>, StoreError>;
}

pub struct DynamoRecordStore {
    table_name: String,
    client: aws_sdk_dynamodb::Client,
}

impl DynamoRecordStore {
    pub fn new(client: aws_sdk_dynamodb::Client, table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            client,
        }
    }
}

impl RecordStore for DynamoRecordStore {
    fn put_record(&self, record: &StoredMessageRecord) -> Result<(), StoreError> {
        let table_name = self.table_name.clone();
        let item = record_to_item(record);
        let client = self.client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_item()
                    .table_name(table_name)
                    .set_item(Some(item))
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| classify_sdk_error("dynamodb put_item", error))
            })
        })
    }

    fn get_record(&self, key: &str) -> Result<Option<StoredMessageRecord>, StoreError> {
        let table_name = self.table_name.clone();
        let record_key = key.to_string();
        let client = self.client.clone();

        let output = tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .get_item()
                    .table_name(table_name)
                    .key(KEY_ATTRIBUTE, AttributeValue::S(record_key))
                    .consistent_read(true)
                    .send()
                    .await
                    .map_err(|error| classify_sdk_error("dynamodb get_item", error))
            })
        })?;

        output.item().map(|item| record_from_item(key, item)).transpose()
    }
}

pub fn record_to_item(record: &StoredMessageRecord) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::from([
        (
            KEY_ATTRIBUTE.to_string(),
            AttributeValue::S(record.key.clone()),
        ),
        (
            RECEIVED_AT_ATTRIBUTE.to_string(),
            AttributeValue::S(record.received_at.clone()),
        ),
    ]);
    if let Some(sender) = &record.sender {
        item.insert(
            SENDER_ATTRIBUTE.to_string(),
            AttributeValue::S(sender.clone()),
        );
    }
    if let Some(subject) = &record.subject {
        item.insert(
            SUBJECT_ATTRIBUTE.to_string(),
            AttributeValue::S(subject.clone()),
        );
    }
    item
}

/// Rebuilds a record from a stored item. A present item without the required
/// attributes is corrupt store content, not an absent record.
pub fn record_from_item(
    requested_key: &str,
    item: &HashMap<String, AttributeValue>,
) -> Result<StoredMessageRecord, StoreError> {
    let required = |name: &str| {
        string_attribute(item, name).ok_or_else(|| StoreError::CorruptItem {
            key: requested_key.to_string(),
            message: format!("missing string attribute '{name}'"),
        })
    };

    Ok(StoredMessageRecord {
        key: required(KEY_ATTRIBUTE)?,
        received_at: required(RECEIVED_AT_ATTRIBUTE)?,
        sender: string_attribute(item, SENDER_ATTRIBUTE),
        subject: string_attribute(item, SUBJECT_ATTRIBUTE),
    })
}

fn string_attribute(item: &HashMap<String, AttributeValue>, name: &str) -> Option<String> {
    item.get(name)
        .and_then(|value| value.as_s().ok())
        .cloned()
}
