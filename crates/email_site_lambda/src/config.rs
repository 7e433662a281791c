use thiserror::Error;

pub const DEFAULT_MAX_BODY_BYTES: u64 = 5 * 1024 * 1024;
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be configured")]
    Missing(&'static str),

    #[error("{name} has invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Process configuration, read once at startup and passed to the handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub docs_table_name: String,
    pub email_bucket_name: String,
    /// Recognized for parity with the deployment; no handler writes to it.
    pub static_bucket_name: Option<String>,
    pub public_url: Option<String>,
    pub email_key_prefix: String,
    pub max_body_bytes: u64,
    pub log_level: String,
}

impl RuntimeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let optional = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let required =
            |name: &'static str| optional(name).ok_or(ConfigError::Missing(name));

        let max_body_bytes = match optional("MAX_BODY_BYTES") {
            Some(value) => parse_positive("MAX_BODY_BYTES", &value)?,
            None => DEFAULT_MAX_BODY_BYTES,
        };

        Ok(Self {
            docs_table_name: required("DOCS_TABLE_NAME")?,
            email_bucket_name: required("EMAIL_BUCKET_NAME")?,
            static_bucket_name: optional("STATIC_BUCKET_NAME"),
            public_url: optional("PUBLIC_URL"),
            email_key_prefix: optional("EMAIL_KEY_PREFIX").unwrap_or_default(),
            max_body_bytes,
            log_level: optional("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        })
    }
}

fn parse_positive(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        name,
        value: value.to_string(),
        reason,
    };
    match value.parse::<u64>() {
        Ok(0) => Err(invalid("must be a positive integer".to_string())),
        Ok(parsed) => Ok(parsed),
        Err(error) => Err(invalid(error.to_string())),
    }
}
