//! Amendment operations.

use super::{format_query, list_query, Filter, ListOptions};
use crate::client::CongressClient;
use crate::errors::CongressResult;
use crate::pagination::Limit;
use crate::types::ApiResponse;
use crate::validation::{validate_congress, validate_number, validate_text_congress, AmendmentType};

/// Service for amendment operations.
pub struct AmendmentsService<'a> {
    client: &'a CongressClient,
}

impl<'a> AmendmentsService<'a> {
    /// Creates a new amendments service.
    pub fn new(client: &'a CongressClient) -> Self {
        Self { client }
    }

    /// Lists amendments sorted by date of latest action.
    pub async fn list_all(&self, options: &ListOptions) -> CongressResult<ApiResponse> {
        self.list("amendment".to_string(), options).await
    }

    /// Lists amendments of a congress.
    pub async fn list_by_congress(&self, congress: Option<u32>, options: &ListOptions) -> CongressResult<ApiResponse> {
        let congress = self.congress(congress)?;
        self.list(format!("amendment/{}", congress), options).await
    }

    /// Lists amendments of a congress and type.
    pub async fn list_by_type(
        &self,
        amendment_type: impl AsRef<str>,
        congress: Option<u32>,
        options: &ListOptions,
    ) -> CongressResult<ApiResponse> {
        let amendment_type: AmendmentType = amendment_type.as_ref().parse()?;
        let congress = self.congress(congress)?;
        self.list(format!("amendment/{}/{}", congress, amendment_type), options)
            .await
    }

    /// Gets an amendment.
    pub async fn get(
        &self,
        amendment_type: impl AsRef<str>,
        number: u32,
        congress: Option<u32>,
    ) -> CongressResult<ApiResponse> {
        let (_, path) = self.amendment_path(amendment_type.as_ref(), number, congress)?;
        let query = format_query(self.client.default_format());
        self.client.fetch_with_limit(&path, &query, Limit::default()).await
    }

    /// Lists actions on an amendment.
    pub async fn actions(
        &self,
        amendment_type: impl AsRef<str>,
        number: u32,
        congress: Option<u32>,
        options: &ListOptions,
    ) -> CongressResult<ApiResponse> {
        let (_, path) = self.amendment_path(amendment_type.as_ref(), number, congress)?;
        self.sub_resource(path, "actions", options).await
    }

    /// Lists cosponsors of an amendment.
    pub async fn cosponsors(
        &self,
        amendment_type: impl AsRef<str>,
        number: u32,
        congress: Option<u32>,
        options: &ListOptions,
    ) -> CongressResult<ApiResponse> {
        let (_, path) = self.amendment_path(amendment_type.as_ref(), number, congress)?;
        self.sub_resource(path, "cosponsors", options).await
    }

    /// Lists amendments to an amendment.
    pub async fn amendments(
        &self,
        amendment_type: impl AsRef<str>,
        number: u32,
        congress: Option<u32>,
        options: &ListOptions,
    ) -> CongressResult<ApiResponse> {
        let (_, path) = self.amendment_path(amendment_type.as_ref(), number, congress)?;
        self.sub_resource(path, "amendments", options).await
    }

    /// Lists text versions of an amendment.
    ///
    /// Text is only published from the 118th Congress on; earlier congresses
    /// fail with [`ValidationError::TextNotSupported`] without a request.
    ///
    /// [`ValidationError::TextNotSupported`]: crate::errors::ValidationError::TextNotSupported
    pub async fn text(
        &self,
        amendment_type: impl AsRef<str>,
        number: u32,
        congress: Option<u32>,
        options: &ListOptions,
    ) -> CongressResult<ApiResponse> {
        let (amendment_type, path) = self.amendment_path(amendment_type.as_ref(), number, congress)?;
        validate_text_congress(self.congress(congress)?, amendment_type)?;
        self.sub_resource(path, "text", options).await
    }

    async fn list(&self, path: String, options: &ListOptions) -> CongressResult<ApiResponse> {
        let query = list_query(options, self.client.default_format(), &[Filter::Dates]);
        self.client
            .fetch_with_limit(&path, &query, options.limit_or(Limit::default()))
            .await
    }

    async fn sub_resource(&self, base: String, resource: &str, options: &ListOptions) -> CongressResult<ApiResponse> {
        let path = format!("{}/{}", base, resource);
        let query = list_query(options, self.client.default_format(), &[]);
        self.client.fetch_with_limit(&path, &query, options.limit_or(Limit::All)).await
    }

    fn amendment_path(
        &self,
        amendment_type: &str,
        number: u32,
        congress: Option<u32>,
    ) -> CongressResult<(AmendmentType, String)> {
        let amendment_type: AmendmentType = amendment_type.parse()?;
        let number = validate_number(number)?;
        let congress = self.congress(congress)?;
        Ok((
            amendment_type,
            format!("amendment/{}/{}/{}", congress, amendment_type, number),
        ))
    }

    fn congress(&self, congress: Option<u32>) -> CongressResult<u32> {
        validate_congress(congress.unwrap_or_else(|| self.client.default_congress())).map_err(Into::into)
    }
}
