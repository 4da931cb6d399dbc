//! Integration tests for pagination over HTTP.

#[cfg(test)]
mod pagination_tests {
    use futures::future::join_all;
    use integrations_congress::mocks::list_page;
    use integrations_congress::{
        CongressClient, CongressError, Limit, ListOptions, PaginationError, QueryParams, TransportErrorKind,
    };
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> CongressClient {
        CongressClient::builder()
            .api_key("integration-key")
            .base_url(format!("{}/v3/", server.uri()))
            .build()
            .unwrap()
    }

    async fn mount_page(server: &MockServer, route: &str, offset: u64, body: Value) {
        Mock::given(method("GET"))
            .and(path(route))
            .and(query_param("offset", offset.to_string()))
            .and(query_param("limit", "250"))
            .and(header("x-api-key", "integration-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(server)
            .await;
    }

    fn ids(records: &[Value]) -> Vec<u64> {
        records.iter().filter_map(|r| r["id"].as_u64()).collect()
    }

    #[tokio::test]
    async fn test_all_records_across_three_pages() {
        let server = MockServer::start().await;
        mount_page(&server, "/v3/bill/118", 0, list_page("bills", 0..250, 620, true)).await;
        mount_page(&server, "/v3/bill/118", 250, list_page("bills", 250..500, 620, true)).await;
        mount_page(&server, "/v3/bill/118", 500, list_page("bills", 500..620, 620, false)).await;

        let client = client_for(&server);
        let response = client
            .bills()
            .list_by_congress(Some(118), &ListOptions::new().all())
            .await
            .unwrap();

        let records = response.records().unwrap();
        assert_eq!(ids(records), (0..620).collect::<Vec<_>>());
        assert_eq!(response.get("pagination"), Some(&json!({ "count": 620 })));
        assert_eq!(client.metrics().total_requests(), 3);
        assert_eq!(client.metrics().pages_followed(), 2);
    }

    #[tokio::test]
    async fn test_bounded_limit_is_one_request() {
        let server = MockServer::start().await;
        let page = list_page("members", 0..10, 2500, true);
        Mock::given(method("GET"))
            .and(path("/v3/member"))
            .and(query_param("limit", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let response = client
            .members()
            .list(&ListOptions::new().limit(Limit::Count(10)))
            .await
            .unwrap();

        assert_eq!(response.as_json(), Some(&page));
    }

    #[tokio::test]
    async fn test_invalid_limit_never_reaches_the_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .fetch_with_limit("bill", &QueryParams::new(), Limit::Count(251))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CongressError::Pagination(PaginationError::InvalidLimit { .. })
        ));
    }

    #[tokio::test]
    async fn test_server_error_mid_loop_returns_no_partial_result() {
        let server = MockServer::start().await;
        mount_page(&server, "/v3/amendment", 0, list_page("amendments", 0..250, 900, true)).await;
        Mock::given(method("GET"))
            .and(path("/v3/amendment"))
            .and(query_param("offset", "250"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream unavailable"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .amendments()
            .list_all(&ListOptions::new().all())
            .await
            .unwrap_err();

        let transport = err.as_transport().expect("transport error");
        assert_eq!(transport.kind(), TransportErrorKind::Status);
        assert_eq!(transport.status_code(), Some(500));
        assert_eq!(transport.body(), Some("upstream unavailable"));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_independent_fetches_run_concurrently() {
        let server = MockServer::start().await;
        mount_page(&server, "/v3/member/A000360/sponsored-legislation", 0, list_page("sponsoredLegislation", 0..250, 300, true)).await;
        mount_page(&server, "/v3/member/A000360/sponsored-legislation", 250, list_page("sponsoredLegislation", 250..300, 300, false)).await;
        mount_page(&server, "/v3/member/B001230/sponsored-legislation", 0, list_page("sponsoredLegislation", 0..250, 260, true)).await;
        mount_page(&server, "/v3/member/B001230/sponsored-legislation", 250, list_page("sponsoredLegislation", 250..260, 260, false)).await;

        let client = client_for(&server);
        let options = ListOptions::new();
        let fetches = ["A000360", "B001230"].into_iter().map(|id| {
            let client = client.clone();
            let options = options.clone();
            async move { client.members().sponsored_legislation(id, &options).await }
        });

        let counts: Vec<usize> = join_all(fetches)
            .await
            .into_iter()
            .map(|r| r.unwrap().records().map_or(0, <[Value]>::len))
            .collect();

        assert_eq!(counts, vec![300, 260]);
    }
}
