use crate::error::{MailError, Result};

/// Longest object name the object store accepts.
pub const MAX_KEY_BYTES: usize = 1024;

/// Extracts the lookup key from the final segment of a request path.
pub fn key_from_path(path: &str) -> Result<&str> {
    let key = path.rsplit('/').next().unwrap_or_default();
    if key.is_empty() {
        return Err(MailError::validation("request path must end with a key"));
    }
    validate_key(key)?;
    Ok(key)
}

/// Derives the record key from the name the mail-reception service stored the
/// raw message under.
pub fn record_key_from_object_key(object_key: &str, prefix: &str) -> Result<String> {
    let Some(remainder) = object_key.strip_prefix(prefix) else {
        return Err(MailError::validation(format!(
            "object '{object_key}' is outside the configured prefix '{prefix}'"
        )));
    };

    if remainder.is_empty() {
        return Err(MailError::validation(format!(
            "object '{object_key}' does not name a message"
        )));
    }

    if remainder.contains('/') {
        return Err(MailError::validation(format!(
            "object '{object_key}' is nested below the configured prefix"
        )));
    }

    validate_key(remainder)?;
    Ok(remainder.to_string())
}

pub fn object_key_for_record(prefix: &str, key: &str) -> String {
    format!("{prefix}{key}")
}

pub fn public_url_for(base_url: &str, key: &str) -> String {
    format!("{}/{key}", base_url.trim_end_matches('/'))
}

fn validate_key(key: &str) -> Result<()> {
    if key.len() > MAX_KEY_BYTES {
        return Err(MailError::validation(format!(
            "key exceeds {MAX_KEY_BYTES} bytes"
        )));
    }
    if key.chars().any(char::is_control) {
        return Err(MailError::validation(
            "key must not contain control characters",
        ));
    }
    Ok(())
}
