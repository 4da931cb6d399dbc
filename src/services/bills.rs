//! Bill operations.

use super::{format_query, list_query, Filter, ListOptions};
use crate::client::CongressClient;
use crate::errors::CongressResult;
use crate::pagination::Limit;
use crate::types::ApiResponse;
use crate::validation::{validate_congress, validate_number, BillType};

const LIST_FILTERS: &[Filter] = &[Filter::Dates, Filter::Sort];

/// Service for bill operations.
pub struct BillsService<'a> {
    client: &'a CongressClient,
}

impl<'a> BillsService<'a> {
    /// Creates a new bills service.
    pub fn new(client: &'a CongressClient) -> Self {
        Self { client }
    }

    /// Lists bills sorted by date of latest action.
    pub async fn list_all(&self, options: &ListOptions) -> CongressResult<ApiResponse> {
        self.list("bill".to_string(), options).await
    }

    /// Lists bills of a congress. `None` uses the configured default congress.
    pub async fn list_by_congress(&self, congress: Option<u32>, options: &ListOptions) -> CongressResult<ApiResponse> {
        let congress = self.congress(congress)?;
        self.list(format!("bill/{}", congress), options).await
    }

    /// Lists bills of a congress and type.
    pub async fn list_by_type(
        &self,
        bill_type: impl AsRef<str>,
        congress: Option<u32>,
        options: &ListOptions,
    ) -> CongressResult<ApiResponse> {
        let bill_type: BillType = bill_type.as_ref().parse()?;
        let congress = self.congress(congress)?;
        self.list(format!("bill/{}/{}", congress, bill_type), options).await
    }

    /// Gets a bill.
    pub async fn get(
        &self,
        bill_type: impl AsRef<str>,
        number: u32,
        congress: Option<u32>,
    ) -> CongressResult<ApiResponse> {
        let path = self.bill_path(bill_type.as_ref(), number, congress)?;
        let query = format_query(self.client.default_format());
        self.client.fetch_with_limit(&path, &query, Limit::default()).await
    }

    /// Lists actions on a bill.
    pub async fn actions(
        &self,
        bill_type: impl AsRef<str>,
        number: u32,
        congress: Option<u32>,
        options: &ListOptions,
    ) -> CongressResult<ApiResponse> {
        self.sub_resource(bill_type.as_ref(), number, congress, "actions", options, &[])
            .await
    }

    /// Lists amendments to a bill.
    pub async fn amendments(
        &self,
        bill_type: impl AsRef<str>,
        number: u32,
        congress: Option<u32>,
        options: &ListOptions,
    ) -> CongressResult<ApiResponse> {
        self.sub_resource(bill_type.as_ref(), number, congress, "amendments", options, &[])
            .await
    }

    /// Lists committees associated with a bill.
    pub async fn committees(
        &self,
        bill_type: impl AsRef<str>,
        number: u32,
        congress: Option<u32>,
        options: &ListOptions,
    ) -> CongressResult<ApiResponse> {
        self.sub_resource(bill_type.as_ref(), number, congress, "committees", options, &[])
            .await
    }

    /// Lists cosponsors of a bill.
    pub async fn cosponsors(
        &self,
        bill_type: impl AsRef<str>,
        number: u32,
        congress: Option<u32>,
        options: &ListOptions,
    ) -> CongressResult<ApiResponse> {
        self.sub_resource(bill_type.as_ref(), number, congress, "cosponsors", options, &[])
            .await
    }

    /// Lists bills related to a bill.
    pub async fn related_bills(
        &self,
        bill_type: impl AsRef<str>,
        number: u32,
        congress: Option<u32>,
        options: &ListOptions,
    ) -> CongressResult<ApiResponse> {
        self.sub_resource(bill_type.as_ref(), number, congress, "relatedbills", options, &[])
            .await
    }

    /// Lists legislative subjects of a bill.
    pub async fn subjects(
        &self,
        bill_type: impl AsRef<str>,
        number: u32,
        congress: Option<u32>,
        options: &ListOptions,
    ) -> CongressResult<ApiResponse> {
        self.sub_resource(bill_type.as_ref(), number, congress, "subjects", options, &[Filter::Dates])
            .await
    }

    /// Lists summaries of a bill.
    pub async fn summaries(
        &self,
        bill_type: impl AsRef<str>,
        number: u32,
        congress: Option<u32>,
        options: &ListOptions,
    ) -> CongressResult<ApiResponse> {
        self.sub_resource(bill_type.as_ref(), number, congress, "summaries", options, &[])
            .await
    }

    /// Lists text versions of a bill.
    pub async fn text(
        &self,
        bill_type: impl AsRef<str>,
        number: u32,
        congress: Option<u32>,
        options: &ListOptions,
    ) -> CongressResult<ApiResponse> {
        self.sub_resource(bill_type.as_ref(), number, congress, "text", options, &[])
            .await
    }

    /// Lists titles of a bill.
    pub async fn titles(
        &self,
        bill_type: impl AsRef<str>,
        number: u32,
        congress: Option<u32>,
        options: &ListOptions,
    ) -> CongressResult<ApiResponse> {
        self.sub_resource(bill_type.as_ref(), number, congress, "titles", options, &[Filter::Dates])
            .await
    }

    // Internal

    async fn list(&self, path: String, options: &ListOptions) -> CongressResult<ApiResponse> {
        let query = list_query(options, self.client.default_format(), LIST_FILTERS);
        self.client
            .fetch_with_limit(&path, &query, options.limit_or(Limit::default()))
            .await
    }

    async fn sub_resource(
        &self,
        bill_type: &str,
        number: u32,
        congress: Option<u32>,
        resource: &str,
        options: &ListOptions,
        filters: &[Filter],
    ) -> CongressResult<ApiResponse> {
        let path = format!("{}/{}", self.bill_path(bill_type, number, congress)?, resource);
        let query = list_query(options, self.client.default_format(), filters);
        self.client.fetch_with_limit(&path, &query, options.limit_or(Limit::All)).await
    }

    fn bill_path(&self, bill_type: &str, number: u32, congress: Option<u32>) -> CongressResult<String> {
        let bill_type: BillType = bill_type.parse()?;
        let number = validate_number(number)?;
        let congress = self.congress(congress)?;
        Ok(format!("bill/{}/{}/{}", congress, bill_type, number))
    }

    fn congress(&self, congress: Option<u32>) -> CongressResult<u32> {
        validate_congress(congress.unwrap_or_else(|| self.client.default_congress())).map_err(Into::into)
    }
}
