use sha2::{Digest, Sha256};

pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Wraps a stored message in a minimal HTML page. The payload is decoded
/// lossily and placed in the body as-is.
pub fn render_html(payload: &[u8]) -> String {
    format!(
        "<html><body>{}</body></html>",
        String::from_utf8_lossy(payload)
    )
}

pub fn content_etag(body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body.as_bytes());
    format!("\"{:x}\"", hasher.finalize())
}
