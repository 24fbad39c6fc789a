//! Backend connection settings loaded via OrthoConfig.
//!
//! Values come from `LEADLINE_*` environment variables or configuration
//! files. [`BackendSettings::connection`] validates them into a
//! [`BackendConnection`] that the outbound adapters consume.

use std::fmt;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

/// Client timeout applied when none is configured.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
/// Bucket holding lead attachments when none is configured.
pub const DEFAULT_FILES_BUCKET: &str = "lead-files";

/// Problems found while resolving [`BackendSettings`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// A required value was not supplied.
    #[error("{key} is not configured; set LEADLINE_{env}")]
    Missing {
        /// Settings key.
        key: &'static str,
        /// Environment variable suffix.
        env: &'static str,
    },
    /// The backend URL could not be parsed.
    #[error("backend url '{url}' is invalid: {reason}")]
    InvalidUrl {
        /// Raw configured value.
        url: String,
        /// Parser message.
        reason: String,
    },
    /// A zero timeout would fail every request immediately.
    #[error("timeout_seconds must be positive")]
    ZeroTimeout,
}

/// Raw settings for the remote backend.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "LEADLINE")]
pub struct BackendSettings {
    /// Base URL of the backend, for example `https://project.example.co`.
    pub url: Option<String>,
    /// API key sent as `apikey` and bearer token.
    pub api_key: Option<String>,
    /// Client timeout in seconds.
    pub timeout_seconds: Option<u64>,
    /// Optional PostgREST schema profile.
    pub schema: Option<String>,
    /// Bucket for lead attachments.
    pub files_bucket: Option<String>,
}

impl BackendSettings {
    /// Configured timeout, falling back to [`DEFAULT_TIMEOUT_SECONDS`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }

    /// Configured attachment bucket, falling back to [`DEFAULT_FILES_BUCKET`].
    pub fn files_bucket(&self) -> &str {
        self.files_bucket.as_deref().unwrap_or(DEFAULT_FILES_BUCKET)
    }

    /// Validate the settings into a usable connection.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the URL or key is missing, the URL does
    /// not parse, or the timeout is zero.
    pub fn connection(&self) -> Result<BackendConnection, SettingsError> {
        let raw_url = required(self.url.as_deref(), "url", "URL")?;
        let api_key = required(self.api_key.as_deref(), "api_key", "API_KEY")?;
        let base_url = Url::parse(raw_url).map_err(|error| SettingsError::InvalidUrl {
            url: raw_url.to_owned(),
            reason: error.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(SettingsError::InvalidUrl {
                url: raw_url.to_owned(),
                reason: "url cannot be used as a base".to_owned(),
            });
        }
        let timeout = self.timeout();
        if timeout.is_zero() {
            return Err(SettingsError::ZeroTimeout);
        }
        Ok(BackendConnection {
            base_url,
            api_key: Zeroizing::new(api_key.to_owned()),
            timeout,
            schema: self
                .schema
                .as_deref()
                .map(str::trim)
                .filter(|schema| !schema.is_empty())
                .map(str::to_owned),
        })
    }
}

fn required<'a>(
    value: Option<&'a str>,
    key: &'static str,
    env: &'static str,
) -> Result<&'a str, SettingsError> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(SettingsError::Missing { key, env })
}

/// Validated connection details shared by the HTTP adapters.
#[derive(Clone)]
pub struct BackendConnection {
    base_url: Url,
    api_key: Zeroizing<String>,
    timeout: Duration,
    schema: Option<String>,
}

impl BackendConnection {
    /// Build a connection directly, bypassing settings resolution.
    pub fn new(base_url: Url, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url,
            api_key: Zeroizing::new(api_key.into()),
            timeout,
            schema: None,
        }
    }

    /// Select a PostgREST schema profile.
    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Client timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Schema profile, if any.
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }
}

impl fmt::Debug for BackendConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConnection")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("schema", &self.schema)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for backend settings resolution.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const KEYS: [&str; 5] = [
        "LEADLINE_URL",
        "LEADLINE_API_KEY",
        "LEADLINE_TIMEOUT_SECONDS",
        "LEADLINE_SCHEMA",
        "LEADLINE_FILES_BUCKET",
    ];

    fn load_from_empty_args() -> BackendSettings {
        BackendSettings::load_from_iter([OsString::from("lead-campaign")])
            .expect("config should load")
    }

    fn settings(url: Option<&str>, api_key: Option<&str>) -> BackendSettings {
        BackendSettings {
            url: url.map(str::to_owned),
            api_key: api_key.map(str::to_owned),
            timeout_seconds: None,
            schema: None,
            files_bucket: None,
        }
    }

    #[rstest]
    fn defaults_apply_when_environment_is_empty() {
        let _guard = lock_env(KEYS.map(|key| (key, None::<String>)));

        let settings = load_from_empty_args();
        assert!(settings.url.is_none());
        assert_eq!(settings.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECONDS));
        assert_eq!(settings.files_bucket(), DEFAULT_FILES_BUCKET);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("LEADLINE_URL", Some("https://crm.example.test".to_owned())),
            ("LEADLINE_API_KEY", Some("anon-key".to_owned())),
            ("LEADLINE_TIMEOUT_SECONDS", Some("5".to_owned())),
            ("LEADLINE_SCHEMA", Some("sales".to_owned())),
            ("LEADLINE_FILES_BUCKET", Some("cards".to_owned())),
        ]);

        let connection = load_from_empty_args()
            .connection()
            .expect("settings resolve");
        assert_eq!(connection.base_url().as_str(), "https://crm.example.test/");
        assert_eq!(connection.api_key(), "anon-key");
        assert_eq!(connection.timeout(), Duration::from_secs(5));
        assert_eq!(connection.schema(), Some("sales"));
    }

    #[rstest]
    #[case::no_url(None, Some("key"), "url")]
    #[case::no_key(Some("https://crm.example.test"), None, "api_key")]
    #[case::blank_key(Some("https://crm.example.test"), Some("  "), "api_key")]
    fn missing_values_are_reported(
        #[case] url: Option<&str>,
        #[case] api_key: Option<&str>,
        #[case] expected: &str,
    ) {
        match settings(url, api_key).connection() {
            Err(SettingsError::Missing { key, .. }) => assert_eq!(key, expected),
            other => panic!("expected a missing-value error, got {other:?}"),
        }
    }

    #[rstest]
    fn debug_output_hides_the_key() {
        let connection = settings(Some("https://crm.example.test"), Some("secret-key"))
            .connection()
            .expect("settings resolve");
        assert!(!format!("{connection:?}").contains("secret-key"));
    }

    #[rstest]
    fn malformed_urls_are_rejected() {
        let result = settings(Some("not a url"), Some("key")).connection();
        assert!(matches!(result, Err(SettingsError::InvalidUrl { .. })));
    }

    #[rstest]
    fn zero_timeout_is_rejected() {
        let mut settings = settings(Some("https://crm.example.test"), Some("key"));
        settings.timeout_seconds = Some(0);
        assert_eq!(settings.connection().err(), Some(SettingsError::ZeroTimeout));
    }
}
