use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::adapters::document_store::RecordStore;
use crate::adapters::object_store::BlobStore;
use crate::config::RuntimeConfig;
use crate::runtime::error::MailError;
use crate::runtime::keys::{key_from_path, object_key_for_record};
use crate::runtime::render::{content_etag, render_html, HTML_CONTENT_TYPE};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrieveConfig {
    pub email_key_prefix: String,
    pub max_body_bytes: u64,
}

impl RetrieveConfig {
    pub fn from_runtime(config: &RuntimeConfig) -> Self {
        Self {
            email_key_prefix: config.email_key_prefix.clone(),
            max_body_bytes: config.max_body_bytes,
        }
    }
}

/// Serves the stored message addressed by the last path segment.
///
/// Read-only: the response depends only on the stores' state at call time.
pub fn handle_retrieval_event(
    event: &Value,
    config: &RetrieveConfig,
    records: &impl RecordStore,
    blobs: &impl BlobStore,
) -> ApiGatewayResponse {
    let method = request_method(event).unwrap_or("GET");
    if !method.eq_ignore_ascii_case("GET") && !method.eq_ignore_ascii_case("HEAD") {
        return error_response(
            405,
            json!({
                "error": "method_not_allowed",
                "message": format!("{method} is not supported"),
            }),
        );
    }

    match retrieve_page(event, config, records, blobs) {
        Ok((key, page)) => {
            info!(
                component = "retrieve_handler",
                event = "page_served",
                key = %key,
                bytes = page.len(),
            );
            let etag = content_etag(&page);
            let body = if method.eq_ignore_ascii_case("HEAD") {
                String::new()
            } else {
                page
            };
            ApiGatewayResponse {
                status_code: 200,
                headers: json!({"Content-Type": HTML_CONTENT_TYPE, "ETag": etag}),
                body,
            }
        }
        Err(failure) => {
            log_failure(&failure);
            mail_error_response(&failure)
        }
    }
}

fn retrieve_page(
    event: &Value,
    config: &RetrieveConfig,
    records: &impl RecordStore,
    blobs: &impl BlobStore,
) -> Result<(String, String), MailError> {
    let key = key_from_path(request_path(event)?)?;

    let Some(record) = records.get_record(key)? else {
        return Err(MailError::not_found(format!(
            "no message stored under '{key}'"
        )));
    };

    let object_key = object_key_for_record(&config.email_key_prefix, &record.key);
    let Some(payload) = blobs.read_object(&object_key, config.max_body_bytes)? else {
        return Err(MailError::not_found(format!(
            "message '{key}' has no stored content"
        )));
    };

    Ok((record.key, render_html(&payload)))
}

/// REST APIs send `path`; HTTP APIs send `rawPath`.
fn request_path(event: &Value) -> Result<&str, MailError> {
    let Some(object) = event.as_object() else {
        return Err(MailError::validation(
            "Request payload must be a JSON object",
        ));
    };

    object
        .get("path")
        .or_else(|| object.get("rawPath"))
        .and_then(Value::as_str)
        .ok_or_else(|| MailError::validation("request is missing a path"))
}

fn request_method(event: &Value) -> Option<&str> {
    event
        .get("httpMethod")
        .or_else(|| {
            event
                .get("requestContext")
                .and_then(|context| context.get("http"))
                .and_then(|http| http.get("method"))
        })
        .and_then(Value::as_str)
}

fn log_failure(failure: &MailError) {
    match failure {
        MailError::Dependency { .. } => error!(
            component = "retrieve_handler",
            event = "retrieve_failed",
            error_code = failure.error_code(),
            error = %failure,
        ),
        _ => warn!(
            component = "retrieve_handler",
            event = "retrieve_rejected",
            error_code = failure.error_code(),
            error = %failure,
        ),
    }
}

fn mail_error_response(failure: &MailError) -> ApiGatewayResponse {
    error_response(
        failure.status_code(),
        json!({
            "error": failure.error_code(),
            "message": failure.to_string(),
        }),
    )
}

fn error_response(status_code: u16, payload: Value) -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code,
        headers: json!({"Content-Type": "application/json"}),
        body: payload.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{
        FailingBlobStore, MemoryBlobStore, MemoryRecordStore, UnavailableRecordStore,
    };
    use crate::runtime::contract::StoredMessageRecord;

    fn config() -> RetrieveConfig {
        RetrieveConfig {
            email_key_prefix: String::new(),
            max_body_bytes: 1024,
        }
    }

    fn record(key: &str) -> StoredMessageRecord {
        StoredMessageRecord {
            key: key.to_string(),
            received_at: "2026-02-14T10:00:00Z".to_string(),
            sender: Some("a@x.com".to_string()),
            subject: None,
        }
    }

    fn get(path: &str) -> Value {
        json!({"path": path, "httpMethod": "GET"})
    }

    fn error_code(response: &ApiGatewayResponse) -> String {
        let body: Value = serde_json::from_str(&response.body).expect("error body should parse");
        body["error"].as_str().unwrap_or_default().to_string()
    }

    #[test]
    fn serves_stored_message_as_html() {
        let records = MemoryRecordStore::with_records(&[record("msg-001")]);
        let blobs = MemoryBlobStore::with_objects(&[("msg-001", b"Hello World")]);

        let response = handle_retrieval_event(&get("/v1/msg-001"), &config(), &records, &blobs);

        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, "<html><body>Hello World</body></html>");
        assert_eq!(response.headers["Content-Type"], HTML_CONTENT_TYPE);
        assert_eq!(
            response.headers["ETag"],
            content_etag("<html><body>Hello World</body></html>")
        );
    }

    #[test]
    fn page_contains_raw_message_text() {
        let message = "From: Alice <a@x.com>\r\nSubject: \"hi\"\r\n\r\nHi & bye";
        let records = MemoryRecordStore::with_records(&[record("msg-002")]);
        let blobs = MemoryBlobStore::with_objects(&[("msg-002", message.as_bytes())]);

        let response = handle_retrieval_event(&get("/v1/msg-002"), &config(), &records, &blobs);

        assert_eq!(response.status_code, 200);
        assert!(response.body.contains(message));
    }

    #[test]
    fn unknown_key_is_not_found_without_blob_fetch() {
        let records = MemoryRecordStore::empty();
        let blobs = MemoryBlobStore::with_objects(&[("msg-001", b"Hello World")]);

        let response = handle_retrieval_event(&get("/v1/msg-001"), &config(), &records, &blobs);

        assert_eq!(response.status_code, 404);
        assert_eq!(error_code(&response), "not_found");
        assert!(blobs.reads().is_empty());
    }

    #[test]
    fn record_without_blob_is_not_found() {
        let records = MemoryRecordStore::with_records(&[record("msg-001")]);
        let blobs = MemoryBlobStore::empty();

        let response = handle_retrieval_event(&get("/v1/msg-001"), &config(), &records, &blobs);

        assert_eq!(response.status_code, 404);
        assert_eq!(blobs.reads(), vec!["msg-001".to_string()]);
    }

    #[test]
    fn empty_trailing_key_is_bad_request() {
        let records = MemoryRecordStore::with_records(&[record("")]);
        let blobs = MemoryBlobStore::with_objects(&[("", b"nothing")]);

        let response = handle_retrieval_event(&get("/v1/"), &config(), &records, &blobs);

        assert_eq!(response.status_code, 400);
        assert_eq!(error_code(&response), "validation_error");
        assert!(blobs.reads().is_empty());
    }

    #[test]
    fn missing_path_is_bad_request() {
        let response = handle_retrieval_event(
            &json!({"httpMethod": "GET"}),
            &config(),
            &MemoryRecordStore::empty(),
            &MemoryBlobStore::empty(),
        );
        assert_eq!(response.status_code, 400);
    }

    #[test]
    fn reads_http_api_raw_path() {
        let records = MemoryRecordStore::with_records(&[record("msg-001")]);
        let blobs = MemoryBlobStore::with_objects(&[("msg-001", b"Hello World")]);
        let event = json!({
            "rawPath": "/v1/msg-001",
            "requestContext": {"http": {"method": "GET"}}
        });

        let response = handle_retrieval_event(&event, &config(), &records, &blobs);
        assert_eq!(response.status_code, 200);
    }

    #[test]
    fn fetches_blob_behind_configured_prefix() {
        let records = MemoryRecordStore::with_records(&[record("abc123")]);
        let blobs = MemoryBlobStore::with_objects(&[("inbound/abc123", b"Hi")]);
        let retrieve_config = RetrieveConfig {
            email_key_prefix: "inbound/".to_string(),
            max_body_bytes: 1024,
        };

        let response =
            handle_retrieval_event(&get("/v1/abc123"), &retrieve_config, &records, &blobs);
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, "<html><body>Hi</body></html>");
    }

    #[test]
    fn head_returns_headers_without_body() {
        let records = MemoryRecordStore::with_records(&[record("msg-001")]);
        let blobs = MemoryBlobStore::with_objects(&[("msg-001", b"Hello World")]);

        let response = handle_retrieval_event(
            &json!({"path": "/v1/msg-001", "httpMethod": "HEAD"}),
            &config(),
            &records,
            &blobs,
        );
        assert_eq!(response.status_code, 200);
        assert!(response.body.is_empty());
        assert_eq!(
            response.headers["ETag"],
            content_etag("<html><body>Hello World</body></html>")
        );
    }

    #[test]
    fn rejects_write_methods() {
        let records = MemoryRecordStore::empty();
        let response = handle_retrieval_event(
            &json!({"path": "/v1/msg-001", "httpMethod": "POST"}),
            &config(),
            &records,
            &MemoryBlobStore::empty(),
        );
        assert_eq!(response.status_code, 405);
        assert_eq!(records.writes(), 0);
    }

    #[test]
    fn dependency_failures_map_to_gateway_errors() {
        let unavailable = handle_retrieval_event(
            &get("/v1/msg-001"),
            &config(),
            &UnavailableRecordStore,
            &MemoryBlobStore::empty(),
        );
        assert_eq!(unavailable.status_code, 503);
        assert_eq!(error_code(&unavailable), "dependency_error");

        let records = MemoryRecordStore::with_records(&[record("msg-001")]);
        let failed =
            handle_retrieval_event(&get("/v1/msg-001"), &config(), &records, &FailingBlobStore);
        assert_eq!(failed.status_code, 502);
    }

    #[test]
    fn oversized_message_is_refused() {
        let records = MemoryRecordStore::with_records(&[record("msg-001")]);
        let blobs = MemoryBlobStore::with_objects(&[("msg-001", b"Hello World")]);
        let retrieve_config = RetrieveConfig {
            email_key_prefix: String::new(),
            max_body_bytes: 4,
        };

        let response =
            handle_retrieval_event(&get("/v1/msg-001"), &retrieve_config, &records, &blobs);
        assert_eq!(response.status_code, 413);
        assert_eq!(error_code(&response), "payload_too_large");
    }
}
