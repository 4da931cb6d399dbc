//! Congress.gov API client implementation.

use crate::config::{CongressConfig, CongressConfigBuilder, ResponseFormat};
use crate::errors::CongressResult;
use crate::observability::Metrics;
use crate::pagination::{Limit, Paginator};
use crate::services::{AmendmentsService, BillsService, MembersService};
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::types::{ApiResponse, QueryParams};
use std::sync::Arc;
use std::time::Duration;

/// Congress.gov API client.
///
/// Cloning is cheap and clones share the connection pool, configuration and
/// metrics, so independent fetches can run concurrently on separate clones.
#[derive(Clone)]
pub struct CongressClient {
    /// HTTP transport.
    transport: Arc<dyn HttpTransport>,
    /// Configuration.
    config: Arc<CongressConfig>,
    /// Request metrics.
    metrics: Arc<Metrics>,
}

impl CongressClient {
    /// Creates a new client backed by reqwest.
    pub fn new(config: CongressConfig) -> CongressResult<Self> {
        config.validate()?;

        let config = Arc::new(config);
        let metrics = Arc::new(Metrics::new());
        let transport = ReqwestTransport::new(config.clone(), metrics.clone())?;

        Ok(Self {
            transport: Arc::new(transport),
            config,
            metrics,
        })
    }

    /// Creates a client over a custom transport.
    pub fn with_transport(config: CongressConfig, transport: Arc<dyn HttpTransport>) -> CongressResult<Self> {
        config.validate()?;

        Ok(Self {
            transport,
            config: Arc::new(config),
            metrics: Arc::new(Metrics::new()),
        })
    }

    /// Creates a client from `CONGRESS_API_*` environment variables.
    pub fn from_env() -> CongressResult<Self> {
        Self::new(CongressConfig::from_env()?)
    }

    /// Creates a client after loading a `.env` file.
    pub fn from_dotenv() -> CongressResult<Self> {
        Self::new(CongressConfig::from_dotenv()?)
    }

    /// Creates a new client builder.
    pub fn builder() -> CongressClientBuilder {
        CongressClientBuilder::new()
    }

    /// Gets the configuration.
    pub fn config(&self) -> &CongressConfig {
        &self.config
    }

    /// Gets the request metrics.
    pub fn metrics(&self) -> Arc<Metrics> {
        self.metrics.clone()
    }

    /// Gets the base URL.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    // Service accessors

    /// Gets the bills service.
    pub fn bills(&self) -> BillsService<'_> {
        BillsService::new(self)
    }

    /// Gets the amendments service.
    pub fn amendments(&self) -> AmendmentsService<'_> {
        AmendmentsService::new(self)
    }

    /// Gets the members service.
    pub fn members(&self) -> MembersService<'_> {
        MembersService::new(self)
    }

    // Requests

    /// Makes a single GET request with the given parameters, unpaginated.
    pub async fn get(&self, path: &str, query: &QueryParams) -> CongressResult<ApiResponse> {
        self.transport.get(path, query).await
    }

    /// Makes a limit-aware GET request.
    ///
    /// See [`Paginator::fetch`] for how `limit` shapes the requests.
    pub async fn fetch_with_limit(&self, path: &str, query: &QueryParams, limit: Limit) -> CongressResult<ApiResponse> {
        Paginator::new(self.transport.as_ref(), &self.metrics)
            .with_max_pages(self.config.max_pages)
            .fetch(path, query, limit)
            .await
    }

    pub(crate) fn default_congress(&self) -> u32 {
        self.config.default_congress
    }

    pub(crate) fn default_format(&self) -> ResponseFormat {
        self.config.default_format
    }
}

impl std::fmt::Debug for CongressClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CongressClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for CongressClient.
pub struct CongressClientBuilder {
    config_builder: CongressConfigBuilder,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl CongressClientBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            config_builder: CongressConfig::builder(),
            transport: None,
        }
    }

    /// Sets the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.api_key(key);
        self
    }

    /// Sets the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.base_url(url);
        self
    }

    /// Sets the default response format.
    pub fn default_format(mut self, format: ResponseFormat) -> Self {
        self.config_builder = self.config_builder.default_format(format);
        self
    }

    /// Sets the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config_builder = self.config_builder.timeout(timeout);
        self
    }

    /// Sets the default congress.
    pub fn default_congress(mut self, congress: u32) -> Self {
        self.config_builder = self.config_builder.default_congress(congress);
        self
    }

    /// Sets the User-Agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.user_agent(ua);
        self
    }

    /// Caps the pages followed by `all` fetches.
    pub fn max_pages(mut self, pages: u32) -> Self {
        self.config_builder = self.config_builder.max_pages(pages);
        self
    }

    /// Uses a custom transport instead of reqwest.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the client.
    pub fn build(self) -> CongressResult<CongressClient> {
        let config = self.config_builder.build()?;
        match self.transport {
            Some(transport) => CongressClient::with_transport(config, transport),
            None => CongressClient::new(config),
        }
    }
}

impl Default for CongressClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{CongressError, ConfigurationError, PaginationError};
    use crate::mocks::{list_page, MockTransport};
    use crate::services::ListOptions;

    fn mock_client(mock: Arc<MockTransport>) -> CongressClient {
        CongressClient::builder()
            .api_key("test-key")
            .transport(mock)
            .build()
            .unwrap()
    }

    #[test]
    fn test_client_builder() {
        let client = CongressClient::builder()
            .api_key("test-key")
            .default_congress(117)
            .user_agent("test-client/1.0")
            .build()
            .unwrap();

        assert_eq!(client.base_url(), "https://api.congress.gov/v3/");
        assert_eq!(client.default_congress(), 117);
        assert!(!format!("{:?}", client).contains("test-key"));
    }

    #[test]
    fn test_client_builder_requires_key() {
        let result = CongressClient::builder().build();
        assert!(matches!(
            result,
            Err(CongressError::Configuration(ConfigurationError::MissingApiKey))
        ));
    }

    #[tokio::test]
    async fn test_get_is_a_single_unpaginated_request() {
        let mock = Arc::new(MockTransport::new());
        mock.on_get_pages("bill", [list_page("bills", 0..250, 500, true)]);
        let client = mock_client(mock.clone());

        let response = client.get("bill", &QueryParams::new()).await.unwrap();

        assert_eq!(response.records().map(<[serde_json::Value]>::len), Some(250));
        assert_eq!(mock.request_count(), 1);
        assert!(mock.last_request().unwrap().query.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_applies_configured_page_ceiling() {
        let mock = Arc::new(MockTransport::new());
        mock.on_get_pages(
            "member",
            [
                list_page("members", 0..250, 1000, true),
                list_page("members", 250..500, 1000, true),
            ],
        );
        let client = CongressClient::builder()
            .api_key("test-key")
            .max_pages(1)
            .transport(mock.clone())
            .build()
            .unwrap();

        let result = client.fetch_with_limit("member", &QueryParams::new(), Limit::All).await;

        assert!(matches!(
            result,
            Err(CongressError::Pagination(PaginationError::PageLimitExceeded { max_pages: 1 }))
        ));
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_records_followed_pages() {
        let mock = Arc::new(MockTransport::new());
        mock.on_get_pages(
            "bill",
            [
                list_page("bills", 0..250, 300, true),
                list_page("bills", 250..300, 300, false),
            ],
        );
        let client = mock_client(mock);

        let response = client.fetch_with_limit("bill", &QueryParams::new(), Limit::All).await.unwrap();

        assert_eq!(response.records().map(<[serde_json::Value]>::len), Some(300));
        assert_eq!(client.metrics().pages_followed(), 1);
    }

    #[tokio::test]
    async fn test_service_accessors_borrow_the_client() {
        let mock = Arc::new(MockTransport::new());
        mock.on_get_pages("bill", [list_page("bills", 0..1, 1, false)])
            .on_get_pages("amendment", [list_page("amendments", 0..1, 1, false)])
            .on_get_pages("member", [list_page("members", 0..1, 1, false)]);
        let client = mock_client(mock.clone());
        let options = ListOptions::new();

        let (bills, amendments, members) = (client.bills(), client.amendments(), client.members());
        bills.list_all(&options).await.unwrap();
        amendments.list_all(&options).await.unwrap();
        members.list(&options).await.unwrap();

        let paths: Vec<String> = mock.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(paths, vec!["bill", "amendment", "member"]);
    }
}
