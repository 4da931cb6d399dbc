//! Pagination engine for the Congress.gov API.
//!
//! Every endpoint call goes through [`Paginator::fetch`]. A bounded limit
//! becomes exactly one request. The `all` sentinel requests pages of
//! [`MAX_LIMIT`] records and follows `pagination.next` until the server stops
//! signalling more, then reassembles one response shaped like a single page.
//!
//! Pages of one fetch are requested strictly in sequence: the offset of page
//! n+1 depends on how many records page n returned.

use crate::errors::{CongressResult, PaginationError};
use crate::observability::{Metrics, TracingHooks};
use crate::transport::HttpTransport;
use crate::types::{discover_data_key, ApiResponse, Page, PageInfo, QueryParams, PAGINATION_KEY, REQUEST_KEY};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;
use tracing::Instrument;
use uuid::Uuid;

/// Maximum records the API returns per request.
pub const MAX_LIMIT: u32 = 250;

/// Default limit of list endpoints.
pub const DEFAULT_LIMIT: u32 = 20;

/// Query parameter carrying the page size.
pub const LIMIT_PARAM: &str = "limit";

/// Query parameter carrying the record offset.
pub const OFFSET_PARAM: &str = "offset";

/// How many records a logical fetch should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// At most this many records, in one request. Valid range is `1..=MAX_LIMIT`.
    Count(u32),
    /// Every record, across as many requests as needed.
    All,
}

impl Limit {
    /// Creates a bounded limit, checking the range.
    pub fn count(n: u32) -> Result<Self, PaginationError> {
        Self::Count(n).validate()
    }

    /// Checks that a bounded limit is within `1..=MAX_LIMIT`.
    pub fn validate(self) -> Result<Self, PaginationError> {
        match self {
            Self::Count(n) if !(1..=MAX_LIMIT).contains(&n) => Err(invalid_limit(n)),
            other => Ok(other),
        }
    }
}

impl Default for Limit {
    fn default() -> Self {
        Self::Count(DEFAULT_LIMIT)
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{}", n),
            Self::All => f.write_str("all"),
        }
    }
}

impl FromStr for Limit {
    type Err = PaginationError;

    /// Parses `"all"` (exactly, lower case) or a decimal integer in range.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(Self::All);
        }

        s.parse::<i64>()
            .map_err(|_| invalid_limit(s))
            .and_then(Self::try_from)
    }
}

impl TryFrom<i64> for Limit {
    type Error = PaginationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .map_err(|_| invalid_limit(value))
            .and_then(Self::count)
    }
}

fn invalid_limit(value: impl ToString) -> PaginationError {
    PaginationError::InvalidLimit {
        value: value.to_string(),
        max: MAX_LIMIT,
    }
}

/// Records gathered while following `next` links.
#[derive(Debug)]
struct Accumulator {
    data_key: String,
    records: Vec<Value>,
    total_count: u64,
    next_offset: u64,
    pages: u32,
    has_next: bool,
    last_request: Option<Value>,
}

impl Accumulator {
    fn start(first: Page, start_offset: u64) -> Self {
        Self {
            next_offset: start_offset + first.records.len() as u64,
            total_count: first.info.count,
            has_next: first.info.has_next(),
            data_key: first.data_key,
            records: first.records,
            pages: 1,
            last_request: first.request,
        }
    }

    fn push(&mut self, page: Page) {
        self.next_offset += page.records.len() as u64;
        self.has_next = page.info.has_next();
        self.last_request = page.request;
        self.records.extend(page.records);
        self.pages += 1;
    }

    fn assemble(self) -> ApiResponse {
        let mut body = Map::new();
        body.insert(self.data_key, Value::Array(self.records));
        body.insert(PAGINATION_KEY.to_string(), json!({ "count": self.total_count }));
        body.insert(
            REQUEST_KEY.to_string(),
            self.last_request.unwrap_or_else(|| json!({})),
        );
        ApiResponse::Json(Value::Object(body))
    }
}

/// States of an `all` fetch. Failures leave the loop through `?`.
enum FetchState {
    Idle,
    FirstPageFetched(Map<String, Value>),
    Paging(Accumulator),
    Done(ApiResponse),
}

/// Limit-aware request engine over an [`HttpTransport`].
pub struct Paginator<'a> {
    transport: &'a dyn HttpTransport,
    metrics: &'a Metrics,
    max_pages: Option<u32>,
}

impl<'a> Paginator<'a> {
    /// Creates a paginator.
    pub fn new(transport: &'a dyn HttpTransport, metrics: &'a Metrics) -> Self {
        Self {
            transport,
            metrics,
            max_pages: None,
        }
    }

    /// Caps the number of pages an `all` fetch may request.
    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Fetches `path` with the given limit.
    ///
    /// Any `limit` in `query` is ignored; the engine sets it. An invalid
    /// limit fails before any request is made. When an `all` fetch fails
    /// part-way, the error is returned and already fetched pages are dropped.
    pub async fn fetch(&self, path: &str, query: &QueryParams, limit: Limit) -> CongressResult<ApiResponse> {
        let limit = limit.validate()?;

        let mut base = query.clone();
        base.remove(LIMIT_PARAM);

        match limit {
            Limit::Count(n) => {
                base.set(LIMIT_PARAM, n);
                self.transport.get(path, &base).await
            }
            Limit::All => {
                let span = tracing::debug_span!("fetch_all", fetch_id = %Uuid::new_v4(), path = %path);
                self.fetch_all(path, &base).instrument(span).await
            }
        }
    }

    async fn fetch_all(&self, path: &str, base: &QueryParams) -> CongressResult<ApiResponse> {
        let start_offset = base
            .get(OFFSET_PARAM)
            .and_then(|o| o.parse::<u64>().ok())
            .unwrap_or(0);

        let mut state = FetchState::Idle;
        loop {
            state = match state {
                FetchState::Idle => {
                    let query = page_query(base, None);
                    let body = self.transport.get(path, &query).await?;
                    FetchState::FirstPageFetched(into_object(body)?)
                }
                FetchState::FirstPageFetched(map) => {
                    let data_key = discover_data_key(&map)?;
                    let info = PageInfo::from_object(&map);

                    if info.has_next() {
                        let first = Page::with_data_key(map, &data_key, 1).map_err(|_| {
                            PaginationError::UnrecognizedShape {
                                reason: format!("data key '{}' does not hold a list", data_key),
                            }
                        })?;
                        TracingHooks::on_page_fetched(path, 1, first.len(), start_offset);
                        FetchState::Paging(Accumulator::start(first, start_offset))
                    } else {
                        let records = map.get(&data_key).and_then(Value::as_array).map_or(0, Vec::len);
                        TracingHooks::on_pagination_complete(path, 1, records, info.count);
                        FetchState::Done(ApiResponse::Json(Value::Object(map)))
                    }
                }
                FetchState::Paging(mut acc) if acc.has_next => {
                    if let Some(max_pages) = self.max_pages {
                        if acc.pages >= max_pages {
                            TracingHooks::on_page_limit_exceeded(path, max_pages);
                            return Err(PaginationError::PageLimitExceeded { max_pages }.into());
                        }
                    }

                    let page_number = acc.pages + 1;
                    let offset = acc.next_offset;
                    let query = page_query(base, Some(offset));
                    let body = self.transport.get(path, &query).await?;
                    let map = into_object(body).map_err(|_| PaginationError::InconsistentDataKey {
                        data_key: acc.data_key.clone(),
                        page: page_number,
                    })?;
                    let page = Page::with_data_key(map, &acc.data_key, page_number)?;

                    self.metrics.record_page_followed();
                    TracingHooks::on_page_fetched(path, page_number, page.len(), offset);
                    acc.push(page);
                    FetchState::Paging(acc)
                }
                FetchState::Paging(acc) => {
                    TracingHooks::on_pagination_complete(path, acc.pages, acc.records.len(), acc.total_count);
                    FetchState::Done(acc.assemble())
                }
                FetchState::Done(response) => return Ok(response),
            };
        }
    }
}

/// Builds the query for one page from the caller's parameters.
fn page_query(base: &QueryParams, offset: Option<u64>) -> QueryParams {
    let mut query = base.clone();
    if let Some(offset) = offset {
        query.set(OFFSET_PARAM, offset);
    }
    query.set(LIMIT_PARAM, MAX_LIMIT);
    query
}

fn into_object(body: ApiResponse) -> Result<Map<String, Value>, PaginationError> {
    match body {
        ApiResponse::Json(Value::Object(map)) => Ok(map),
        ApiResponse::Json(_) => Err(PaginationError::UnrecognizedShape {
            reason: "response is not a JSON object".to_string(),
        }),
        ApiResponse::Raw { content_type, .. } => Err(PaginationError::UnrecognizedShape {
            reason: format!(
                "non-JSON response ({}) cannot be paginated",
                content_type.as_deref().unwrap_or("no content type")
            ),
        }),
    }
}
