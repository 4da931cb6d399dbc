//! Configuration types for the Congress.gov client.
//!
//! Configuration is an explicit value built once at startup, either through
//! [`CongressConfigBuilder`] or from the environment, and handed to the client
//! constructor. It is never mutated afterwards.

use crate::errors::{ConfigurationError, CongressResult};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Default Congress.gov API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.congress.gov/v3/";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default maximum retry attempts (accepted, not acted upon by the client).
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default congress used when an endpoint call omits one.
pub const DEFAULT_CONGRESS: u32 = 118;

/// Default User-Agent header.
pub const DEFAULT_USER_AGENT: &str = "integrations-congress/0.1.0";

/// Response format requested from the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    /// JSON responses.
    #[default]
    Json,
    /// XML responses.
    Xml,
}

impl ResponseFormat {
    /// Value of the `format` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
        }
    }

    /// Value of the `accept` header.
    pub fn accept_header(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Xml => "application/xml",
        }
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseFormat {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "xml" => Ok(Self::Xml),
            _ => Err(ConfigurationError::InvalidFormat(s.to_string())),
        }
    }
}

/// Congress.gov client configuration.
#[derive(Clone)]
pub struct CongressConfig {
    /// API key (stored securely).
    pub(crate) api_key: SecretString,
    /// API base URL.
    pub base_url: String,
    /// Default response format.
    pub default_format: ResponseFormat,
    /// Request timeout.
    pub timeout: Duration,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// Maximum retry attempts. Accepted for compatibility; the client does not retry.
    pub max_retries: u32,
    /// Congress used when endpoint calls omit one.
    pub default_congress: u32,
    /// User-Agent header.
    pub user_agent: String,
    /// Ceiling on pages fetched by a single `all` request. `None` is unbounded.
    pub max_pages: Option<u32>,
}

impl CongressConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> CongressConfigBuilder {
        CongressConfigBuilder::new()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `CONGRESS_API_KEY` (required): API key
    /// - `CONGRESS_API_BASE_URL` (optional): Custom base URL
    /// - `CONGRESS_API_FORMAT` (optional): `json` or `xml`
    /// - `CONGRESS_API_MAX_RETRIES` (optional): Maximum retry attempts
    /// - `CONGRESS_API_TIMEOUT` (optional): Request timeout in seconds
    /// - `CONGRESS_API_DEFAULT_CONGRESS` (optional): Default congress number
    /// - `CONGRESS_API_MAX_PAGES` (optional): Page ceiling for `all` fetches
    pub fn from_env() -> CongressResult<Self> {
        let api_key = std::env::var("CONGRESS_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigurationError::MissingApiKey)?;

        let mut builder = CongressConfigBuilder::new().api_key(api_key);

        if let Ok(base_url) = std::env::var("CONGRESS_API_BASE_URL") {
            builder = builder.base_url(base_url);
        }

        if let Ok(format) = std::env::var("CONGRESS_API_FORMAT") {
            builder = builder.default_format(format.parse()?);
        }

        if let Some(retries) = env_number::<u32>("CONGRESS_API_MAX_RETRIES")? {
            builder = builder.max_retries(retries);
        }

        if let Some(timeout_secs) = env_number::<u64>("CONGRESS_API_TIMEOUT")? {
            builder = builder.timeout(Duration::from_secs(timeout_secs));
        }

        if let Some(congress) = env_number::<u32>("CONGRESS_API_DEFAULT_CONGRESS")? {
            builder = builder.default_congress(congress);
        }

        if let Some(max_pages) = env_number::<u32>("CONGRESS_API_MAX_PAGES")? {
            builder = builder.max_pages(max_pages);
        }

        builder.build()
    }

    /// Loads a `.env` file from the working directory or its parents, then
    /// reads the configuration from the environment.
    ///
    /// Variables already set in the process take precedence over the file.
    /// A missing file is skipped; a malformed one is an error.
    pub fn from_dotenv() -> CongressResult<Self> {
        load_dotenv(dotenvy::dotenv())?;
        Self::from_env()
    }

    /// Like [`CongressConfig::from_dotenv`], reading the given file.
    pub fn from_dotenv_path(path: impl AsRef<Path>) -> CongressResult<Self> {
        load_dotenv(dotenvy::from_path(path.as_ref()).map(|()| path.as_ref().to_path_buf()))?;
        Self::from_env()
    }

    /// Returns the API key (exposing the secret).
    pub(crate) fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Resolves an endpoint path against the base URL.
    pub fn endpoint_url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(ConfigurationError::MissingApiKey);
        }

        let parsed = url::Url::parse(&self.base_url).map_err(|e| {
            ConfigurationError::InvalidBaseUrl {
                url: self.base_url.clone(),
                message: e.to_string(),
            }
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigurationError::InvalidBaseUrl {
                url: self.base_url.clone(),
                message: "must start with http:// or https://".to_string(),
            });
        }

        if self.timeout.is_zero() {
            return Err(ConfigurationError::InvalidValue {
                name: "timeout",
                message: "must be greater than zero".to_string(),
            });
        }

        if self.default_congress == 0 {
            return Err(ConfigurationError::InvalidValue {
                name: "default_congress",
                message: "must be a positive integer".to_string(),
            });
        }

        if self.max_pages == Some(0) {
            return Err(ConfigurationError::InvalidValue {
                name: "max_pages",
                message: "must be at least 1 when set".to_string(),
            });
        }

        Ok(())
    }
}

impl fmt::Debug for CongressConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CongressConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("default_format", &self.default_format)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("max_retries", &self.max_retries)
            .field("default_congress", &self.default_congress)
            .field("user_agent", &self.user_agent)
            .field("max_pages", &self.max_pages)
            .finish()
    }
}

fn env_number<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigurationError>
where
    T::Err: fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigurationError::InvalidValue {
                name,
                message: format!("'{}': {}", raw, e),
            }),
        Err(_) => Ok(None),
    }
}

/// Builder for CongressConfig.
#[derive(Default)]
pub struct CongressConfigBuilder {
    api_key: Option<SecretString>,
    base_url: Option<String>,
    default_format: Option<ResponseFormat>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    max_retries: Option<u32>,
    default_congress: Option<u32>,
    user_agent: Option<String>,
    max_pages: Option<u32>,
}

impl CongressConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::new(key.into()));
        self
    }

    /// Sets the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the default response format.
    pub fn default_format(mut self, format: ResponseFormat) -> Self {
        self.default_format = Some(format);
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the maximum retry attempts.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Sets the default congress.
    pub fn default_congress(mut self, congress: u32) -> Self {
        self.default_congress = Some(congress);
        self
    }

    /// Sets the User-Agent header.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Caps the number of pages a single `all` fetch may request.
    pub fn max_pages(mut self, pages: u32) -> Self {
        self.max_pages = Some(pages);
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> CongressResult<CongressConfig> {
        let api_key = self.api_key.ok_or(ConfigurationError::MissingApiKey)?;

        let config = CongressConfig {
            api_key,
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            default_format: self.default_format.unwrap_or_default(),
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            connect_timeout: self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            default_congress: self.default_congress.unwrap_or(DEFAULT_CONGRESS),
            user_agent: self.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            max_pages: self.max_pages,
        };

        config.validate()?;
        Ok(config)
    }
}

fn load_dotenv(result: Result<PathBuf, dotenvy::Error>) -> Result<(), ConfigurationError> {
    match result {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "Loaded .env file");
            Ok(())
        }
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(ConfigurationError::DotEnv(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CongressError;

    #[test]
    fn test_config_builder_defaults() {
        let config = CongressConfig::builder().api_key("test-key").build().unwrap();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.default_format, ResponseFormat::Json);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.default_congress, 118);
        assert!(config.max_pages.is_none());
        assert_eq!(config.api_key(), "test-key");
    }

    #[test]
    fn test_missing_api_key() {
        let result = CongressConfig::builder().build();
        assert!(matches!(
            result,
            Err(CongressError::Configuration(ConfigurationError::MissingApiKey))
        ));

        let result = CongressConfig::builder().api_key("   ").build();
        assert!(matches!(
            result,
            Err(CongressError::Configuration(ConfigurationError::MissingApiKey))
        ));
    }

    #[test]
    fn test_invalid_base_url() {
        let result = CongressConfig::builder()
            .api_key("k")
            .base_url("ftp://example.com")
            .build();
        assert!(matches!(
            result,
            Err(CongressError::Configuration(ConfigurationError::InvalidBaseUrl { .. }))
        ));

        let result = CongressConfig::builder().api_key("k").base_url("not a url").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_max_pages_rejected() {
        let result = CongressConfig::builder().api_key("k").max_pages(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_endpoint_url() {
        let config = CongressConfig::builder().api_key("k").build().unwrap();
        assert_eq!(
            config.endpoint_url("bill/118"),
            "https://api.congress.gov/v3/bill/118"
        );
        assert_eq!(
            config.endpoint_url("/member/A000001"),
            "https://api.congress.gov/v3/member/A000001"
        );

        let config = CongressConfig::builder()
            .api_key("k")
            .base_url("http://localhost:8080")
            .build()
            .unwrap();
        assert_eq!(config.endpoint_url("bill"), "http://localhost:8080/bill");
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = CongressConfig::builder().api_key("super-secret").build().unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_response_format_parse() {
        assert_eq!("json".parse::<ResponseFormat>().unwrap(), ResponseFormat::Json);
        assert_eq!("XML".parse::<ResponseFormat>().unwrap(), ResponseFormat::Xml);
        assert!("yaml".parse::<ResponseFormat>().is_err());
        assert_eq!(ResponseFormat::Xml.accept_header(), "application/xml");
    }

    #[test]
    fn test_from_env() {
        temp_env::with_vars(
            [
                ("CONGRESS_API_KEY", Some("env-key")),
                ("CONGRESS_API_BASE_URL", Some("http://localhost:9999/v3/")),
                ("CONGRESS_API_FORMAT", Some("xml")),
                ("CONGRESS_API_MAX_RETRIES", Some("5")),
                ("CONGRESS_API_TIMEOUT", Some("12")),
                ("CONGRESS_API_DEFAULT_CONGRESS", Some("117")),
                ("CONGRESS_API_MAX_PAGES", None),
            ],
            || {
                let config = CongressConfig::from_env().unwrap();
                assert_eq!(config.api_key(), "env-key");
                assert_eq!(config.base_url, "http://localhost:9999/v3/");
                assert_eq!(config.default_format, ResponseFormat::Xml);
                assert_eq!(config.max_retries, 5);
                assert_eq!(config.timeout, Duration::from_secs(12));
                assert_eq!(config.default_congress, 117);
                assert!(config.max_pages.is_none());
            },
        );
    }

    #[test]
    fn test_from_env_missing_key() {
        temp_env::with_var_unset("CONGRESS_API_KEY", || {
            let result = CongressConfig::from_env();
            assert!(matches!(
                result,
                Err(CongressError::Configuration(ConfigurationError::MissingApiKey))
            ));
        });
    }

    #[test]
    fn test_from_env_bad_timeout() {
        temp_env::with_vars(
            [
                ("CONGRESS_API_KEY", Some("env-key")),
                ("CONGRESS_API_TIMEOUT", Some("soon")),
            ],
            || {
                let result = CongressConfig::from_env();
                assert!(matches!(
                    result,
                    Err(CongressError::Configuration(ConfigurationError::InvalidValue {
                        name: "CONGRESS_API_TIMEOUT",
                        ..
                    }))
                ));
            },
        );
    }

    fn write_env_file(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("congress-{}.env", uuid::Uuid::new_v4()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_dotenv_does_not_override_process_env() {
        let path = write_env_file("CONGRESS_API_KEY=file-key\nCONGRESS_API_DEFAULT_CONGRESS=116\n");
        temp_env::with_vars(
            [
                ("CONGRESS_API_KEY", Some("process-key")),
                ("CONGRESS_API_DEFAULT_CONGRESS", None),
            ],
            || {
                let config = CongressConfig::from_dotenv_path(&path).unwrap();
                assert_eq!(config.api_key(), "process-key");
                assert_eq!(config.default_congress, 116);
            },
        );
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_dotenv_malformed_file_is_an_error() {
        let path = write_env_file("CONGRESS_API_KEY='unterminated\n");
        temp_env::with_var("CONGRESS_API_KEY", Some("process-key"), || {
            let result = CongressConfig::from_dotenv_path(&path);
            assert!(matches!(
                result,
                Err(CongressError::Configuration(ConfigurationError::DotEnv(_)))
            ));
        });
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_dotenv_missing_file_is_skipped() {
        let path = std::env::temp_dir().join(format!("congress-missing-{}.env", uuid::Uuid::new_v4()));
        temp_env::with_var("CONGRESS_API_KEY", Some("process-key"), || {
            let config = CongressConfig::from_dotenv_path(&path).unwrap();
            assert_eq!(config.api_key(), "process-key");
        });
    }
}
