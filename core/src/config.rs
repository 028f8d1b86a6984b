//! Process-wide client configuration.
//!
//! Loaded once at startup, from code or from environment variables, and
//! read-only afterwards.
//!
//! ## Environment Variables
//! - `RPC_ENDPOINT_URL`: backend endpoint (required)
//! - `RPC_SHARED_SECRET`: value of the `x-shared-secret` header
//! - `RPC_CONTENT_MODE`: `text` (default) or `json`
//! - `RPC_MAX_ATTEMPTS`: total attempts per call, including the first
//! - `RPC_BASE_DELAY_MS`: linear backoff step in milliseconds
//! - `RPC_TIMEOUT_MS`: per-attempt timeout in milliseconds

use std::str::FromStr;
use std::time::Duration;

use reqwest::header::HeaderValue;
use url::Url;

use crate::error::ConfigError;
use crate::policy::RetryPolicy;

/// How the JSON envelope is labelled on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentMode {
    /// `text/plain;charset=utf-8`: a CORS simple request, no preflight.
    #[default]
    SimpleText,
    /// `application/json`, allowing the shared-secret header.
    Json,
}

impl ContentMode {
    pub fn content_type(self) -> &'static str {
        match self {
            ContentMode::SimpleText => "text/plain;charset=utf-8",
            ContentMode::Json => "application/json",
        }
    }
}

impl FromStr for ContentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "simple" | "text/plain" => Ok(ContentMode::SimpleText),
            "json" | "application/json" => Ok(ContentMode::Json),
            other => Err(format!("unknown content mode {other:?}, expected \"text\" or \"json\"")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub endpoint: Url,
    pub shared_secret: Option<String>,
    pub content_mode: ContentMode,
    pub policy: RetryPolicy,
}

impl ClientConfig {
    /// Configuration with the default policy and simple-text encoding.
    pub fn new(endpoint: &str) -> Result<Self, ConfigError> {
        let endpoint = parse_endpoint(endpoint)?;
        Ok(Self {
            endpoint,
            shared_secret: None,
            content_mode: ContentMode::default(),
            policy: RetryPolicy::default(),
        })
    }

    pub fn with_shared_secret(mut self, secret: impl Into<String>) -> Self {
        self.shared_secret = Some(secret.into());
        self
    }

    pub fn with_content_mode(mut self, mode: ContentMode) -> Self {
        self.content_mode = mode;
        self
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.policy.per_attempt_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if let Some(secret) = &self.shared_secret {
            if self.content_mode == ContentMode::SimpleText {
                return Err(ConfigError::SecretRequiresJsonMode);
            }
            HeaderValue::from_str(secret).map_err(|_| ConfigError::InvalidSecret)?;
        }
        Ok(())
    }

    /// Load configuration from the process environment.
    ///
    /// # Errors
    /// Returns `ConfigError` if `RPC_ENDPOINT_URL` is missing or any variable
    /// holds an unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = lookup("RPC_ENDPOINT_URL").ok_or(ConfigError::Missing("RPC_ENDPOINT_URL"))?;
        let mut config = Self::new(&endpoint)?;

        if let Some(secret) = lookup("RPC_SHARED_SECRET").filter(|s| !s.is_empty()) {
            config.shared_secret = Some(secret);
        }
        if let Some(mode) = lookup("RPC_CONTENT_MODE") {
            config.content_mode = mode
                .parse()
                .map_err(|reason| ConfigError::Invalid { var: "RPC_CONTENT_MODE", reason })?;
        }

        let mut policy = RetryPolicy::default();
        if let Some(attempts) = parse_var::<u32, _>(&lookup, "RPC_MAX_ATTEMPTS")? {
            policy = policy.with_max_attempts(attempts);
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "RPC_BASE_DELAY_MS")? {
            policy = policy.with_base_delay(Duration::from_millis(ms));
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "RPC_TIMEOUT_MS")? {
            policy = policy.with_per_attempt_timeout(Duration::from_millis(ms));
        }
        config.policy = policy;

        config.validate()?;
        tracing::debug!(endpoint = %config.endpoint, mode = ?config.content_mode, "client configuration loaded");
        Ok(config)
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::Endpoint(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Endpoint(format!("unsupported scheme {other:?}"))),
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::Invalid { var, reason: e.to_string() })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn loads_minimal_environment() {
        let config = ClientConfig::from_lookup(lookup(&[(
            "RPC_ENDPOINT_URL",
            "https://script.example.com/macros/s/abc/exec",
        )]))
        .unwrap();
        assert_eq!(config.endpoint.as_str(), "https://script.example.com/macros/s/abc/exec");
        assert_eq!(config.content_mode, ContentMode::SimpleText);
        assert_eq!(config.shared_secret, None);
        assert_eq!(config.policy, RetryPolicy::default());
    }

    #[test]
    fn loads_full_environment() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("RPC_ENDPOINT_URL", "http://localhost:3000/exec"),
            ("RPC_SHARED_SECRET", "hunter2"),
            ("RPC_CONTENT_MODE", "json"),
            ("RPC_MAX_ATTEMPTS", "5"),
            ("RPC_BASE_DELAY_MS", "200"),
            ("RPC_TIMEOUT_MS", "1500"),
        ]))
        .unwrap();
        assert_eq!(config.shared_secret.as_deref(), Some("hunter2"));
        assert_eq!(config.content_mode, ContentMode::Json);
        assert_eq!(config.policy.max_attempts(), 5);
        assert_eq!(config.policy.base_delay, Duration::from_millis(200));
        assert_eq!(config.policy.per_attempt_timeout, Duration::from_millis(1500));
    }

    #[test]
    fn missing_endpoint_is_reported() {
        let err = ClientConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("RPC_ENDPOINT_URL"));
    }

    #[test]
    fn invalid_number_names_the_variable() {
        let err = ClientConfig::from_lookup(lookup(&[
            ("RPC_ENDPOINT_URL", "http://localhost/exec"),
            ("RPC_MAX_ATTEMPTS", "three"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "RPC_MAX_ATTEMPTS", .. }));
    }

    #[test]
    fn secret_in_simple_text_mode_is_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[
            ("RPC_ENDPOINT_URL", "http://localhost/exec"),
            ("RPC_SHARED_SECRET", "hunter2"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::SecretRequiresJsonMode);
    }

    #[test]
    fn secret_must_be_a_legal_header_value() {
        let config = ClientConfig::new("http://localhost/exec")
            .unwrap()
            .with_content_mode(ContentMode::Json)
            .with_shared_secret("bad\nsecret");
        assert_eq!(config.validate(), Err(ConfigError::InvalidSecret));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = ClientConfig::new("http://localhost/exec")
            .unwrap()
            .with_policy(RetryPolicy::default().with_per_attempt_timeout(Duration::ZERO));
        assert_eq!(config.validate(), Err(ConfigError::ZeroTimeout));
    }

    #[test]
    fn non_http_endpoint_is_rejected() {
        assert!(matches!(ClientConfig::new("ftp://example.com/exec"), Err(ConfigError::Endpoint(_))));
        assert!(matches!(ClientConfig::new("not a url"), Err(ConfigError::Endpoint(_))));
    }

    #[test]
    fn content_mode_parses_aliases() {
        assert_eq!("TEXT".parse::<ContentMode>(), Ok(ContentMode::SimpleText));
        assert_eq!("application/json".parse::<ContentMode>(), Ok(ContentMode::Json));
        assert!("xml".parse::<ContentMode>().is_err());
    }
}
