//! Member operations.

use super::{format_query, list_query, Filter, ListOptions};
use crate::client::CongressClient;
use crate::errors::CongressResult;
use crate::pagination::Limit;
use crate::types::ApiResponse;
use crate::validation::{validate_bioguide_id, validate_congress, validate_district, validate_state_code};

/// Service for congressional member operations.
pub struct MembersService<'a> {
    client: &'a CongressClient,
}

impl<'a> MembersService<'a> {
    /// Creates a new members service.
    pub fn new(client: &'a CongressClient) -> Self {
        Self { client }
    }

    /// Lists members.
    pub async fn list(&self, options: &ListOptions) -> CongressResult<ApiResponse> {
        self.fetch("member", options, &[Filter::Dates, Filter::CurrentMember], Limit::default())
            .await
    }

    /// Gets a member by bioguide id.
    pub async fn get(&self, bioguide_id: &str) -> CongressResult<ApiResponse> {
        let id = validate_bioguide_id(bioguide_id)?;
        let query = format_query(self.client.default_format());
        self.client
            .fetch_with_limit(&format!("member/{}", id), &query, Limit::default())
            .await
    }

    /// Lists legislation sponsored by a member.
    pub async fn sponsored_legislation(&self, bioguide_id: &str, options: &ListOptions) -> CongressResult<ApiResponse> {
        let id = validate_bioguide_id(bioguide_id)?;
        self.fetch(&format!("member/{}/sponsored-legislation", id), options, &[], Limit::All)
            .await
    }

    /// Lists legislation cosponsored by a member.
    pub async fn cosponsored_legislation(&self, bioguide_id: &str, options: &ListOptions) -> CongressResult<ApiResponse> {
        let id = validate_bioguide_id(bioguide_id)?;
        self.fetch(&format!("member/{}/cosponsored-legislation", id), options, &[], Limit::All)
            .await
    }

    /// Lists members of a congress.
    pub async fn list_by_congress(&self, congress: Option<u32>, options: &ListOptions) -> CongressResult<ApiResponse> {
        let congress = self.congress(congress)?;
        self.fetch(
            &format!("member/congress/{}", congress),
            options,
            &[Filter::CurrentMember],
            Limit::default(),
        )
        .await
    }

    /// Lists members of a state. The state code is sent upper-case.
    pub async fn list_by_state(&self, state_code: &str, options: &ListOptions) -> CongressResult<ApiResponse> {
        let state = validate_state_code(state_code)?;
        self.fetch(&format!("member/{}", state), options, &[Filter::CurrentMember], Limit::default())
            .await
    }

    /// Lists members of a state district.
    pub async fn list_by_state_district(
        &self,
        state_code: &str,
        district: u32,
        options: &ListOptions,
    ) -> CongressResult<ApiResponse> {
        let state = validate_state_code(state_code)?;
        let district = validate_district(district)?;
        self.fetch(
            &format!("member/{}/{}", state, district),
            options,
            &[Filter::CurrentMember],
            Limit::default(),
        )
        .await
    }

    /// Lists members of a state district in a congress.
    pub async fn list_by_congress_state_district(
        &self,
        congress: Option<u32>,
        state_code: &str,
        district: u32,
        options: &ListOptions,
    ) -> CongressResult<ApiResponse> {
        let congress = self.congress(congress)?;
        let state = validate_state_code(state_code)?;
        let district = validate_district(district)?;
        self.fetch(
            &format!("member/congress/{}/{}/{}", congress, state, district),
            options,
            &[Filter::CurrentMember],
            Limit::default(),
        )
        .await
    }

    async fn fetch(
        &self,
        path: &str,
        options: &ListOptions,
        filters: &[Filter],
        default_limit: Limit,
    ) -> CongressResult<ApiResponse> {
        let query = list_query(options, self.client.default_format(), filters);
        self.client
            .fetch_with_limit(path, &query, options.limit_or(default_limit))
            .await
    }

    fn congress(&self, congress: Option<u32>) -> CongressResult<u32> {
        validate_congress(congress.unwrap_or_else(|| self.client.default_congress())).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{CongressError, ValidationError};
    use crate::mocks::{list_page, MockResponse, MockTransport};
    use crate::types::QueryParams;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;
    use test_case::test_case;

    fn setup() -> (Arc<MockTransport>, CongressClient) {
        let mock = Arc::new(MockTransport::new());
        let client = CongressClient::builder()
            .api_key("test-key")
            .transport(mock.clone())
            .build()
            .unwrap();
        (mock, client)
    }

    #[tokio::test]
    async fn test_list_sends_current_member() {
        let (mock, client) = setup();
        mock.on_get("member", MockResponse::json(list_page("members", 0..20, 2500, true)));

        client
            .members()
            .list(&ListOptions::new().current_member(true))
            .await
            .unwrap();

        assert_eq!(
            mock.last_request().unwrap().query,
            QueryParams::new()
                .with("currentMember", true)
                .with("format", "json")
                .with("limit", 20)
                .with("offset", 0)
        );
    }

    #[tokio::test]
    async fn test_get_member() {
        let (mock, client) = setup();
        mock.on_get(
            "member/L000174",
            MockResponse::json(json!({ "member": { "bioguideId": "L000174" }, "request": {} })),
        );

        let response = client.members().get("L000174").await.unwrap();
        assert_eq!(response.data_key(), Some("member"));
    }

    #[tokio::test]
    async fn test_sponsored_legislation_collects_all_pages() {
        let (mock, client) = setup();
        mock.on_get_pages(
            "member/L000174/sponsored-legislation",
            [
                list_page("sponsoredLegislation", 0..250, 251, true),
                list_page("sponsoredLegislation", 250..251, 251, false),
            ],
        );

        let response = client
            .members()
            .sponsored_legislation("L000174", &ListOptions::new())
            .await
            .unwrap();

        assert_eq!(response.total_count(), Some(251));
        assert_eq!(mock.requests()[1].query.get("offset"), Some("250"));
    }

    #[tokio::test]
    async fn test_state_district_paths() {
        let (mock, client) = setup();
        mock.on_get("member/MI", MockResponse::json(list_page("members", 0..1, 1, false)))
            .on_get("member/MI/10", MockResponse::json(list_page("members", 0..1, 1, false)))
            .on_get(
                "member/congress/118/MI/10",
                MockResponse::json(list_page("members", 0..1, 1, false)),
            );

        let members = client.members();
        let options = ListOptions::new();
        members.list_by_state("mi", &options).await.unwrap();
        members.list_by_state_district("mi", 10, &options).await.unwrap();
        members
            .list_by_congress_state_district(None, "Mi", 10, &options)
            .await
            .unwrap();

        assert!(mock.is_exhausted());
    }

    #[test_case(""; "empty id")]
    #[test_case("A000/1"; "path separator")]
    #[test_case("L000174?x=1"; "query injection")]
    #[tokio::test]
    async fn test_invalid_bioguide_id(id: &str) {
        let (mock, client) = setup();

        let err = client.members().get(id).await.unwrap_err();
        assert!(matches!(
            err,
            CongressError::Validation(ValidationError::InvalidBioguideId(_))
        ));
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_state_code() {
        let (mock, client) = setup();

        let err = client
            .members()
            .list_by_state("Michigan", &ListOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CongressError::Validation(ValidationError::InvalidStateCode(_))
        ));
        assert_eq!(mock.request_count(), 0);
    }
}
