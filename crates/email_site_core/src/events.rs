//! Decoding of inbound-message notifications.
//!
//! The mail-reception service stores the raw message and publishes a receipt
//! notification. Depending on the wiring, that notification reaches the
//! ingestion handler directly, inside an SNS record, or inside an SQS record
//! whose body is itself an SNS envelope. Every shape is flattened into
//! [`IngestionEvent`]s here.

use serde_json::{Map, Value};

use crate::contract::IngestionEvent;
use crate::error::{MailError, Result};

/// SQS body → SNS envelope → SES notification is the deepest supported nesting.
const MAX_ENVELOPE_DEPTH: usize = 3;

pub fn decode_ingestion_events(event: &Value) -> Result<Vec<IngestionEvent>> {
    decode_value(event, 0)
}

fn decode_value(value: &Value, depth: usize) -> Result<Vec<IngestionEvent>> {
    if depth > MAX_ENVELOPE_DEPTH {
        return Err(MailError::validation(
            "ingestion event is nested too deeply",
        ));
    }

    let Some(object) = value.as_object() else {
        return Err(MailError::validation(
            "ingestion payload must be a JSON object",
        ));
    };

    if let Some(records) = object.get("Records") {
        let records = records
            .as_array()
            .ok_or_else(|| MailError::validation("Records must be an array"))?;
        if records.is_empty() {
            return Err(MailError::validation("ingestion event carries no records"));
        }

        let mut events = Vec::with_capacity(records.len());
        for record in records {
            events.extend(decode_record(record, depth)?);
        }
        return Ok(events);
    }

    if is_sns_envelope(object) {
        let message = object
            .get("Message")
            .and_then(Value::as_str)
            .ok_or_else(|| MailError::validation("SNS envelope Message must be a string"))?;
        return decode_text(message, depth + 1);
    }

    if is_ses_notification(object) {
        return decode_ses_notification(object).map(|event| vec![event]);
    }

    if object.contains_key("location") {
        return decode_direct_event(value).map(|event| vec![event]);
    }

    Err(MailError::validation("unrecognized ingestion event shape"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordSource {
    Sqs,
    Sns,
}

fn record_source(record: &Value) -> Option<RecordSource> {
    if record.get("eventSource").and_then(Value::as_str) == Some("aws:sqs") {
        return Some(RecordSource::Sqs);
    }
    if record.get("EventSource").and_then(Value::as_str) == Some("aws:sns") {
        return Some(RecordSource::Sns);
    }
    None
}

fn decode_record(record: &Value, depth: usize) -> Result<Vec<IngestionEvent>> {
    match record_source(record) {
        Some(RecordSource::Sqs) => {
            let body = record
                .get("body")
                .and_then(Value::as_str)
                .ok_or_else(|| MailError::validation("SQS record body must be a string"))?;
            decode_text(body, depth + 1)
        }
        Some(RecordSource::Sns) => {
            let message = record
                .get("Sns")
                .and_then(|sns| sns.get("Message"))
                .and_then(Value::as_str)
                .ok_or_else(|| MailError::validation("SNS record Message must be a string"))?;
            decode_text(message, depth + 1)
        }
        None => Err(MailError::validation(
            "record must originate from aws:sqs or aws:sns",
        )),
    }
}

fn decode_text(text: &str, depth: usize) -> Result<Vec<IngestionEvent>> {
    let value: Value = serde_json::from_str(text)
        .map_err(|error| MailError::validation(format!("malformed notification JSON: {error}")))?;
    decode_value(&value, depth)
}

fn is_sns_envelope(object: &Map<String, Value>) -> bool {
    object.get("Type").and_then(Value::as_str) == Some("Notification")
        && object.contains_key("Message")
}

fn is_ses_notification(object: &Map<String, Value>) -> bool {
    object.get("notificationType").and_then(Value::as_str) == Some("Received")
        || (object.contains_key("mail") && object.contains_key("receipt"))
}

fn decode_ses_notification(object: &Map<String, Value>) -> Result<IngestionEvent> {
    let action = object
        .get("receipt")
        .and_then(|receipt| receipt.get("action"))
        .ok_or_else(|| MailError::validation("SES notification is missing receipt.action"))?;

    if let Some(kind) = action.get("type").and_then(Value::as_str) {
        if kind != "S3" {
            return Err(MailError::validation(format!(
                "SES receipt action '{kind}' does not store the message in object storage"
            )));
        }
    }

    let location = object_key(action.get("objectKey")).ok_or_else(|| {
        MailError::validation("SES receipt action is missing objectKey")
    })?;

    let mail = object.get("mail");
    let common_headers = mail.and_then(|mail| mail.get("commonHeaders"));

    Ok(IngestionEvent {
        bucket: non_empty_str(action.get("bucketName")),
        location,
        sender: mail.and_then(sender_from_mail),
        subject: non_empty_str(common_headers.and_then(|headers| headers.get("subject"))),
        received_at: non_empty_str(mail.and_then(|mail| mail.get("timestamp"))),
    })
}

/// Header `From` wins over the envelope sender, which is often a bounce address.
fn sender_from_mail(mail: &Value) -> Option<String> {
    let common_from = mail
        .get("commonHeaders")
        .and_then(|headers| headers.get("from"))
        .and_then(Value::as_array)
        .and_then(|from| from.first());

    let raw_from = mail
        .get("headers")
        .and_then(Value::as_array)
        .and_then(|headers| {
            headers.iter().find(|header| {
                header
                    .get("name")
                    .and_then(Value::as_str)
                    .is_some_and(|name| name.eq_ignore_ascii_case("from"))
            })
        })
        .and_then(|header| header.get("value"));

    non_empty_str(common_from)
        .or_else(|| non_empty_str(raw_from))
        .or_else(|| non_empty_str(mail.get("source")))
}

fn decode_direct_event(value: &Value) -> Result<IngestionEvent> {
    let event: IngestionEvent = serde_json::from_value(value.clone())
        .map_err(|error| MailError::validation(format!("malformed ingestion event: {error}")))?;

    if event.location.is_empty() {
        return Err(MailError::validation("location cannot be empty"));
    }
    Ok(event)
}

/// Object names are taken verbatim; surrounding spaces are part of the name.
fn object_key(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}
