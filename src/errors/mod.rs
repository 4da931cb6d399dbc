//! Error types for the Congress.gov client.
//!
//! Errors are grouped by the layer that raises them: configuration at
//! construction time, validation in the endpoint services, pagination in the
//! request engine and transport failures from the HTTP adapter.

use std::fmt;
use thiserror::Error;

/// Result type alias for Congress.gov operations.
pub type CongressResult<T> = Result<T, CongressError>;

/// Root error type for the Congress.gov client.
#[derive(Error, Debug)]
pub enum CongressError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Transport (network or HTTP) error.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Pagination error.
    #[error("Pagination error: {0}")]
    Pagination(#[from] PaginationError),

    /// Parameter validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CongressError {
    /// Gets the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONGRESS_CONFIG",
            Self::Transport(_) => "CONGRESS_TRANSPORT",
            Self::Pagination(_) => "CONGRESS_PAGINATION",
            Self::Validation(_) => "CONGRESS_VALIDATION",
        }
    }

    /// Gets the HTTP status code, if the upstream API returned one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Transport(e) => e.status_code(),
            _ => None,
        }
    }

    /// Returns true if a caller-level retry might succeed.
    ///
    /// The client itself never retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Returns the transport error, if this is one.
    pub fn as_transport(&self) -> Option<&TransportError> {
        match self {
            Self::Transport(e) => Some(e),
            _ => None,
        }
    }
}

/// Configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// API key was not supplied.
    #[error("CONGRESS_API_KEY environment variable is required")]
    MissingApiKey,

    /// Base URL is malformed.
    #[error("Invalid base URL '{url}': {message}")]
    InvalidBaseUrl {
        /// Offending URL.
        url: String,
        /// Reason.
        message: String,
    },

    /// Unknown response format.
    #[error("Invalid response format '{0}': must be 'json' or 'xml'")]
    InvalidFormat(String),

    /// A setting had an unusable value.
    #[error("Invalid value for {name}: {message}")]
    InvalidValue {
        /// Setting name.
        name: &'static str,
        /// Reason.
        message: String,
    },

    /// The HTTP client could not be built.
    #[error("Failed to create HTTP client: {0}")]
    HttpClient(String),

    /// A `.env` file exists but could not be loaded.
    #[error("Failed to load .env file: {0}")]
    DotEnv(String),
}

/// Kinds of transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection could not be established.
    ConnectionFailed,
    /// Request timed out.
    Timeout,
    /// Server answered with a non-2xx status.
    Status,
    /// Response declared JSON but could not be parsed.
    InvalidJson,
    /// Any other request failure.
    Request,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionFailed => write!(f, "connection_failed"),
            Self::Timeout => write!(f, "timeout"),
            Self::Status => write!(f, "http_status"),
            Self::InvalidJson => write!(f, "invalid_json"),
            Self::Request => write!(f, "request_failed"),
        }
    }
}

/// Network or HTTP failure with diagnostics.
#[derive(Error, Debug)]
pub struct TransportError {
    /// Error kind.
    kind: TransportErrorKind,
    /// Human-readable message.
    message: String,
    /// HTTP status code.
    status_code: Option<u16>,
    /// Raw response body.
    body: Option<String>,
    /// Underlying cause.
    #[source]
    cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        if let Some(code) = self.status_code {
            write!(f, " (HTTP {})", code)?;
        }
        Ok(())
    }
}

impl TransportError {
    /// Creates a new transport error.
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
            body: None,
            cause: None,
        }
    }

    /// Creates an error for a non-2xx response.
    pub fn from_status(status: u16, body: Option<String>) -> Self {
        let mut error = Self::new(
            TransportErrorKind::Status,
            format!("API request failed: HTTP {} error", status),
        )
        .with_status(status);
        error.body = body.filter(|b| !b.is_empty());
        error
    }

    /// Creates a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, message)
    }

    /// Sets the HTTP status code.
    pub fn with_status(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }

    /// Sets the raw response body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the underlying cause.
    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Gets the error kind.
    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    /// Gets the message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Gets the HTTP status code.
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// Gets the raw response body.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Returns true if this error is worth retrying at the caller's level.
    pub fn is_retryable(&self) -> bool {
        match self.kind {
            TransportErrorKind::ConnectionFailed | TransportErrorKind::Timeout => true,
            TransportErrorKind::Status => {
                matches!(self.status_code, Some(429) | Some(500..=599))
            }
            _ => false,
        }
    }
}

/// Errors raised by the pagination engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaginationError {
    /// Limit outside `[1, MAX_LIMIT]` or not the `all` sentinel.
    #[error("Limit must be an integer between 1 and {max} or 'all' (got {value})")]
    InvalidLimit {
        /// Rejected input.
        value: String,
        /// Upper bound.
        max: u32,
    },

    /// Response has no identifiable data key.
    #[error("Unable to determine data key in response: {reason}")]
    UnrecognizedShape {
        /// What was wrong with the response.
        reason: String,
    },

    /// A later page did not carry the data key of the first page.
    #[error("Page {page} is missing data key '{data_key}'")]
    InconsistentDataKey {
        /// Data key discovered on the first page.
        data_key: String,
        /// One-based page number.
        page: u32,
    },

    /// The configured page ceiling was reached before the server stopped paging.
    #[error("Exceeded maximum of {max_pages} pages while fetching all records")]
    PageLimitExceeded {
        /// Configured ceiling.
        max_pages: u32,
    },
}

/// Errors raised by endpoint parameter validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Unknown bill type.
    #[error("Invalid bill type: {value}. Must be one of: {valid}")]
    InvalidBillType {
        /// Rejected input.
        value: String,
        /// Accepted values, comma separated.
        valid: String,
    },

    /// Unknown amendment type.
    #[error("Invalid amendment type: {value}. Must be one of: {valid}")]
    InvalidAmendmentType {
        /// Rejected input.
        value: String,
        /// Accepted values, comma separated.
        valid: String,
    },

    /// Bill or amendment number is not positive.
    #[error("Invalid bill number: {0}. Must be a positive integer.")]
    InvalidBillNumber(u32),

    /// Congress number is not positive.
    #[error("Invalid congress number: {0}. Must be a positive integer.")]
    InvalidCongress(u32),

    /// Amendment text is unavailable for this congress.
    #[error("Text endpoint is only available for congress >= {min} (got {congress})")]
    TextNotSupported {
        /// Requested congress.
        congress: u32,
        /// Earliest supported congress.
        min: u32,
    },

    /// Bioguide identifier is empty or malformed.
    #[error("Invalid bioguide id: '{0}'")]
    InvalidBioguideId(String),

    /// State code is not two ASCII letters.
    #[error("Invalid state code: '{0}'. Must be a two-letter code.")]
    InvalidStateCode(String),

    /// District number is out of range.
    #[error("Invalid district: {0}")]
    InvalidDistrict(u32),
}
