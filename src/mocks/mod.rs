//! Mock implementations for testing code built on the Congress.gov client.

use crate::errors::{CongressResult, TransportError, TransportErrorKind};
use crate::transport::HttpTransport;
use crate::types::{ApiResponse, QueryParams};
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{json, Map, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

/// A scripted response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// A JSON body.
    Json(Value),
    /// A non-JSON body.
    Raw {
        /// Content type.
        content_type: String,
        /// Payload.
        body: Bytes,
    },
    /// A non-2xx status.
    Status {
        /// Status code.
        status: u16,
        /// Response body.
        body: Option<String>,
    },
    /// A request timeout.
    Timeout,
    /// A connection failure.
    ConnectionFailed,
}

impl MockResponse {
    /// Creates a JSON response.
    pub fn json(body: Value) -> Self {
        Self::Json(body)
    }

    /// Creates an XML response.
    pub fn xml(body: &str) -> Self {
        Self::Raw {
            content_type: "application/xml".to_string(),
            body: Bytes::copy_from_slice(body.as_bytes()),
        }
    }

    /// Creates an error response with the given status.
    pub fn status(status: u16, body: &str) -> Self {
        Self::Status {
            status,
            body: Some(body.to_string()),
        }
    }

    fn into_result(self) -> CongressResult<ApiResponse> {
        match self {
            Self::Json(v) => Ok(ApiResponse::Json(v)),
            Self::Raw { content_type, body } => Ok(ApiResponse::Raw {
                content_type: Some(content_type),
                bytes: body,
            }),
            Self::Status { status, body } => Err(TransportError::from_status(status, body).into()),
            Self::Timeout => Err(TransportError::timeout("API request failed: request timed out").into()),
            Self::ConnectionFailed => Err(TransportError::new(
                TransportErrorKind::ConnectionFailed,
                "API request failed: connection refused",
            )
            .into()),
        }
    }
}

/// A recorded mock request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockRequest {
    /// Request path.
    pub path: String,
    /// Query parameters.
    pub query: QueryParams,
}

/// In-memory transport returning scripted responses.
///
/// Responses are registered per path and served first-in first-out.
/// Requests with no remaining response fail with a 404 transport error.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, VecDeque<MockResponse>>>,
    requests: Mutex<Vec<MockRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockTransport {
    /// Creates a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response for a path.
    pub fn on_get(&self, path: &str, response: MockResponse) -> &Self {
        lock(&self.responses)
            .entry(normalize(path))
            .or_default()
            .push_back(response);
        self
    }

    /// Queues several JSON pages for a path.
    pub fn on_get_pages(&self, path: &str, pages: impl IntoIterator<Item = Value>) -> &Self {
        for page in pages {
            self.on_get(path, MockResponse::Json(page));
        }
        self
    }

    /// Gets all recorded requests.
    pub fn requests(&self) -> Vec<MockRequest> {
        lock(&self.requests).clone()
    }

    /// Gets the number of recorded requests.
    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Gets the most recent request.
    pub fn last_request(&self) -> Option<MockRequest> {
        lock(&self.requests).last().cloned()
    }

    /// Returns true if every queued response was consumed.
    pub fn is_exhausted(&self) -> bool {
        lock(&self.responses).values().all(VecDeque::is_empty)
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn get(&self, path: &str, query: &QueryParams) -> CongressResult<ApiResponse> {
        let key = normalize(path);
        lock(&self.requests).push(MockRequest {
            path: key.clone(),
            query: query.clone(),
        });

        let response = lock(&self.responses)
            .get_mut(&key)
            .and_then(VecDeque::pop_front);

        match response {
            Some(response) => response.into_result(),
            None => Err(TransportError::from_status(
                404,
                Some(format!("No mock response for GET {}", key)),
            )
            .into()),
        }
    }
}

fn normalize(path: &str) -> String {
    path.trim_matches('/').to_string()
}

/// Builds a synthetic list page.
///
/// Records are `{"id": n}` for `n` in `ids`. When `next` is true the page
/// carries a `pagination.next` URL.
pub fn list_page(data_key: &str, ids: std::ops::Range<u64>, count: u64, next: bool) -> Value {
    let records: Vec<Value> = ids.map(|id| json!({ "id": id })).collect();
    let mut pagination = json!({ "count": count });
    if next {
        pagination["next"] = json!(format!(
            "https://api.congress.gov/v3/{}?offset={}",
            data_key,
            records.len()
        ));
    }

    let mut page = Map::new();
    page.insert(data_key.to_string(), Value::Array(records));
    page.insert("pagination".to_string(), pagination);
    page.insert(
        "request".to_string(),
        json!({ "contentType": "application/json", "format": "json" }),
    );
    Value::Object(page)
}
