//! HTTP transport layer for the Congress.gov client.
//!
//! The transport owns the connection pool, the fixed headers and the base URL.
//! It performs a single GET per call: no retries, no caching.

use crate::config::CongressConfig;
use crate::errors::{ConfigurationError, CongressResult, TransportError, TransportErrorKind};
use crate::observability::{redact_url, Metrics, RequestTimer, TracingHooks};
use crate::types::{ApiResponse, QueryParams};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Response};
use std::sync::Arc;
use tracing::instrument;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// HTTP transport trait for issuing API requests.
///
/// Implementations must be safe to share between concurrent fetches.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Performs a GET request for `path` relative to the base URL.
    async fn get(&self, path: &str, query: &QueryParams) -> CongressResult<ApiResponse>;
}

/// Default HTTP transport implementation using reqwest.
pub struct ReqwestTransport {
    client: Client,
    config: Arc<CongressConfig>,
    metrics: Arc<Metrics>,
}

impl ReqwestTransport {
    /// Creates a transport from the configuration, recording into `metrics`.
    pub fn new(config: Arc<CongressConfig>, metrics: Arc<Metrics>) -> CongressResult<Self> {
        let headers = Self::default_headers(&config)?;

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ConfigurationError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            config,
            metrics,
        })
    }

    /// Gets the request metrics.
    pub fn metrics(&self) -> Arc<Metrics> {
        self.metrics.clone()
    }

    fn default_headers(config: &CongressConfig) -> CongressResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        let mut key = HeaderValue::from_str(config.api_key()).map_err(|_| {
            ConfigurationError::InvalidValue {
                name: "api_key",
                message: "contains characters not allowed in a header".to_string(),
            }
        })?;
        key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key);

        headers.insert(
            ACCEPT,
            HeaderValue::from_static(config.default_format.accept_header()),
        );

        let user_agent = HeaderValue::from_str(&config.user_agent).map_err(|_| {
            ConfigurationError::InvalidValue {
                name: "user_agent",
                message: "contains characters not allowed in a header".to_string(),
            }
        })?;
        headers.insert(USER_AGENT, user_agent);

        Ok(headers)
    }

    /// Full request URL for logs, with any `api_key` parameter masked.
    fn log_url(url: &str, query: &QueryParams) -> String {
        let query = query.to_query_string();
        if query.is_empty() {
            redact_url(url)
        } else {
            redact_url(&format!("{}?{}", url, query))
        }
    }

    fn map_send_error(e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::timeout(format!("API request failed: request timed out: {}", e))
                .with_cause(e)
        } else if e.is_connect() {
            TransportError::new(
                TransportErrorKind::ConnectionFailed,
                format!("API request failed: connection failed: {}", e),
            )
            .with_cause(e)
        } else {
            TransportError::new(TransportErrorKind::Request, format!("API request failed: {}", e))
                .with_cause(e)
        }
    }

    async fn parse_response(response: Response) -> Result<ApiResponse, TransportError> {
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        if !status.is_success() {
            let body = response.text().await.ok();
            return Err(TransportError::from_status(status.as_u16(), body));
        }

        let bytes = response.bytes().await.map_err(|e| {
            TransportError::new(
                TransportErrorKind::Request,
                format!("Failed to read response body: {}", e),
            )
            .with_status(status.as_u16())
            .with_cause(e)
        })?;

        let is_json = content_type
            .as_deref()
            .map(|ct| ct.contains("application/json"))
            .unwrap_or(false);

        if is_json {
            serde_json::from_slice(&bytes).map(ApiResponse::Json).map_err(|e| {
                TransportError::new(
                    TransportErrorKind::InvalidJson,
                    format!("Failed to parse JSON response: {}", e),
                )
                .with_status(status.as_u16())
                .with_body(String::from_utf8_lossy(&bytes).into_owned())
                .with_cause(e)
            })
        } else {
            Ok(ApiResponse::Raw {
                content_type,
                bytes,
            })
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[instrument(skip(self, query))]
    async fn get(&self, path: &str, query: &QueryParams) -> CongressResult<ApiResponse> {
        let url = self.config.endpoint_url(path);
        let log_url = Self::log_url(&url, query);
        TracingHooks::on_request_start(&log_url);

        let timer = RequestTimer::new(self.metrics.clone());

        let response = match self.client.get(&url).query(query).send().await {
            Ok(response) => response,
            Err(e) => {
                let error = Self::map_send_error(e);
                timer.failure();
                TracingHooks::on_request_error(&log_url, &error.to_string());
                return Err(error.into());
            }
        };

        let status = response.status().as_u16();
        match Self::parse_response(response).await {
            Ok(body) => {
                let elapsed = timer.success();
                TracingHooks::on_request_complete(&log_url, status, elapsed);
                Ok(body)
            }
            Err(error) => {
                timer.failure();
                TracingHooks::on_request_error(&log_url, &error.to_string());
                Err(error.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transport_for(server: &MockServer) -> ReqwestTransport {
        let config = CongressConfig::builder()
            .api_key("test-key")
            .base_url(format!("{}/v3/", server.uri()))
            .build()
            .unwrap();
        ReqwestTransport::new(Arc::new(config), Arc::new(Metrics::new())).unwrap()
    }

    #[test]
    fn test_log_url_masks_api_key_param() {
        let query: QueryParams = [("api_key", "secret"), ("limit", "250"), ("offset", "0")]
            .into_iter()
            .collect();

        let logged = ReqwestTransport::log_url("https://api.congress.gov/v3/bill", &query);
        assert!(!logged.contains("secret"));
        assert!(logged.contains("limit=250"));
        assert!(logged.contains("offset=0"));

        assert_eq!(
            ReqwestTransport::log_url("https://api.congress.gov/v3/bill", &QueryParams::new()),
            "https://api.congress.gov/v3/bill"
        );
    }

    #[tokio::test]
    async fn test_get_json_sends_fixed_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v3/bill/118"))
            .and(header("x-api-key", "test-key"))
            .and(header("accept", "application/json"))
            .and(query_param("limit", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "bills": [{"number": "1"}],
                "pagination": {"count": 1}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let transport = transport_for(&server);
        let query = QueryParams::new().with("limit", 20);
        let body = transport.get("bill/118", &query).await.unwrap();

        assert_eq!(body.data_key(), Some("bills"));
        assert_eq!(transport.metrics().successful_requests(), 1);
    }

    #[tokio::test]
    async fn test_get_non_json_returns_raw() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v3/bill"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<api-root><bills/></api-root>", "application/xml"),
            )
            .mount(&server)
            .await;

        let transport = transport_for(&server);
        let body = transport.get("bill", &QueryParams::new()).await.unwrap();

        match body {
            ApiResponse::Raw {
                content_type,
                bytes,
            } => {
                assert_eq!(content_type.as_deref(), Some("application/xml"));
                assert_eq!(&bytes[..], b"<api-root><bills/></api-root>");
            }
            other => panic!("expected raw body, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_success_status_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v3/bill/118/hr/99999"))
            .respond_with(
                ResponseTemplate::new(404).set_body_string("{\"error\": \"Unknown resource\"}"),
            )
            .mount(&server)
            .await;

        let transport = transport_for(&server);
        let err = transport
            .get("bill/118/hr/99999", &QueryParams::new())
            .await
            .unwrap_err();

        let transport_err = err.as_transport().expect("transport error");
        assert_eq!(transport_err.kind(), TransportErrorKind::Status);
        assert_eq!(transport_err.status_code(), Some(404));
        assert_eq!(transport_err.body(), Some("{\"error\": \"Unknown resource\"}"));
        assert_eq!(transport.metrics().failed_requests(), 1);
    }

    #[tokio::test]
    async fn test_malformed_json_is_invalid_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v3/member"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("{not json", "application/json"))
            .mount(&server)
            .await;

        let transport = transport_for(&server);
        let err = transport.get("member", &QueryParams::new()).await.unwrap_err();

        let transport_err = err.as_transport().expect("transport error");
        assert_eq!(transport_err.kind(), TransportErrorKind::InvalidJson);
        assert_eq!(transport_err.body(), Some("{not json"));
    }

    #[tokio::test]
    async fn test_timeout_maps_to_timeout_kind() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"bills": []}))
                    .set_delay(std::time::Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let config = CongressConfig::builder()
            .api_key("test-key")
            .base_url(server.uri())
            .timeout(std::time::Duration::from_millis(50))
            .build()
            .unwrap();
        let transport = ReqwestTransport::new(Arc::new(config), Arc::new(Metrics::new())).unwrap();

        let err = transport.get("bill", &QueryParams::new()).await.unwrap_err();
        assert_eq!(err.as_transport().map(TransportError::kind), Some(TransportErrorKind::Timeout));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_xml_format_sets_accept_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("accept", "application/xml"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<x/>", "application/xml"))
            .expect(1)
            .mount(&server)
            .await;

        let config = CongressConfig::builder()
            .api_key("test-key")
            .base_url(server.uri())
            .default_format(crate::config::ResponseFormat::Xml)
            .build()
            .unwrap();
        let transport = ReqwestTransport::new(Arc::new(config), Arc::new(Metrics::new())).unwrap();

        let body = transport.get("bill", &QueryParams::new()).await.unwrap();
        assert!(body.is_raw());
    }
}
