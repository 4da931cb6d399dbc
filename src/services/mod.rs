//! Congress.gov API service implementations.

mod amendments;
mod bills;
mod members;

pub use amendments::*;
pub use bills::*;
pub use members::*;

use crate::config::ResponseFormat;
use crate::pagination::{Limit, OFFSET_PARAM};
use crate::types::QueryParams;
use chrono::{DateTime, SecondsFormat, Utc};

/// Options shared by list operations.
///
/// Unset fields fall back to per-operation defaults: the client's format,
/// offset 0 and the operation's default limit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Response format.
    pub format: Option<ResponseFormat>,
    /// Zero-based record offset.
    pub offset: Option<u64>,
    /// Record limit.
    pub limit: Option<Limit>,
    /// Only records updated at or after this time.
    pub from_datetime: Option<DateTime<Utc>>,
    /// Only records updated at or before this time.
    pub to_datetime: Option<DateTime<Utc>>,
    /// Sort order, for example `updateDate+desc`.
    pub sort: Option<String>,
    /// Restrict member lists to current (or former) members.
    pub current_member: Option<bool>,
}

impl ListOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the response format.
    pub fn format(mut self, format: ResponseFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Sets the offset.
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Sets the limit.
    pub fn limit(mut self, limit: Limit) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Requests every record.
    pub fn all(self) -> Self {
        self.limit(Limit::All)
    }

    /// Sets the update window start.
    pub fn from_datetime(mut self, from: DateTime<Utc>) -> Self {
        self.from_datetime = Some(from);
        self
    }

    /// Sets the update window end.
    pub fn to_datetime(mut self, to: DateTime<Utc>) -> Self {
        self.to_datetime = Some(to);
        self
    }

    /// Sets the sort order.
    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Filters members by current status.
    pub fn current_member(mut self, current: bool) -> Self {
        self.current_member = Some(current);
        self
    }

    fn limit_or(&self, default: Limit) -> Limit {
        self.limit.unwrap_or(default)
    }
}

/// Optional filters an operation forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Filter {
    Dates,
    Sort,
    CurrentMember,
}

/// Builds the query of a list operation from its options.
fn list_query(options: &ListOptions, default_format: ResponseFormat, filters: &[Filter]) -> QueryParams {
    let mut query = QueryParams::new();
    query
        .set("format", options.format.unwrap_or(default_format))
        .set(OFFSET_PARAM, options.offset.unwrap_or(0));

    for filter in filters {
        match filter {
            Filter::Dates => {
                query
                    .set_opt("fromDateTime", options.from_datetime.map(format_datetime))
                    .set_opt("toDateTime", options.to_datetime.map(format_datetime));
            }
            Filter::Sort => {
                query.set_opt("sort", options.sort.as_deref());
            }
            Filter::CurrentMember => {
                query.set_opt("currentMember", options.current_member);
            }
        }
    }

    query
}

/// Query of a single-record lookup.
fn format_query(format: ResponseFormat) -> QueryParams {
    QueryParams::new().with("format", format)
}

fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}
