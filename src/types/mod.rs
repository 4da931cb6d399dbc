//! Request and response types shared by the transport and pagination layers.
//!
//! Records returned by the API are never parsed into domain structs; they
//! stay as opaque [`serde_json::Value`]s so every endpoint shares one shape.

use crate::errors::PaginationError;
use bytes::Bytes;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Response key holding pagination metadata.
pub const PAGINATION_KEY: &str = "pagination";

/// Response key echoing the request.
pub const REQUEST_KEY: &str = "request";

/// Keys that can never be the data key of a response.
pub const RESERVED_KEYS: &[&str] = &[PAGINATION_KEY, REQUEST_KEY];

/// Query parameters for a GET request.
///
/// Keys are unique and kept sorted. Absent values are never stored, so they
/// never reach the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueryParams {
    params: BTreeMap<String, String>,
}

impl QueryParams {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a parameter, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) -> &mut Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    /// Sets a parameter if a value is present; otherwise removes the key.
    pub fn set_opt<V: ToString>(&mut self, key: impl Into<String>, value: Option<V>) -> &mut Self {
        let key = key.into();
        match value {
            Some(v) => {
                self.params.insert(key, v.to_string());
            }
            None => {
                self.params.remove(&key);
            }
        }
        self
    }

    /// Builder-style [`QueryParams::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    /// Builder-style [`QueryParams::set_opt`].
    pub fn with_opt<V: ToString>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.set_opt(key, value);
        self
    }

    /// Removes a parameter, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.params.remove(key)
    }

    /// Gets a parameter value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Returns true if the key is set.
    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns true if no parameters are set.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Iterates over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Renders the parameters as a URL-encoded query string.
    pub fn to_query_string(&self) -> String {
        serde_urlencoded::to_string(&self.params).unwrap_or_default()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.set(k, v);
        }
        params
    }
}

/// A parsed API response.
///
/// JSON responses are parsed; anything else (for example XML) is returned as
/// raw bytes and must not be assumed to have a structured shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// Parsed JSON body.
    Json(Value),
    /// Unparsed non-JSON body.
    Raw {
        /// Declared content type, if any.
        content_type: Option<String>,
        /// Payload bytes.
        bytes: Bytes,
    },
}

impl ApiResponse {
    /// Returns the JSON body, if this is a JSON response.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(v) => Some(v),
            Self::Raw { .. } => None,
        }
    }

    /// Consumes the response and returns the JSON body.
    pub fn into_json(self) -> Option<Value> {
        match self {
            Self::Json(v) => Some(v),
            Self::Raw { .. } => None,
        }
    }

    /// Returns the raw payload, if this is not a JSON response.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Raw { bytes, .. } => Some(bytes),
            Self::Json(_) => None,
        }
    }

    /// Returns true if the body was not parsed.
    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw { .. })
    }

    /// Looks up a top-level field of a JSON object response.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_json().and_then(|v| v.get(key))
    }

    /// Discovers the data key of a JSON object response.
    pub fn data_key(&self) -> Option<&str> {
        self.as_json()
            .and_then(Value::as_object)
            .and_then(|map| {
                let key = discover_data_key(map).ok()?;
                map.get_key_value(&key).map(|(k, _)| k.as_str())
            })
    }

    /// Returns the records under the data key, if it holds an array.
    pub fn records(&self) -> Option<&[Value]> {
        let key = self.data_key()?;
        self.get(key)?.as_array().map(Vec::as_slice)
    }

    /// Returns the server-reported total count.
    pub fn total_count(&self) -> Option<u64> {
        self.get(PAGINATION_KEY)?.get("count")?.as_u64()
    }
}

impl fmt::Display for ApiResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(v) => write!(f, "{}", v),
            Self::Raw { bytes, .. } => write!(f, "{}", String::from_utf8_lossy(bytes)),
        }
    }
}

/// Pagination metadata of one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    /// Server-reported total number of records.
    pub count: u64,
    /// URL of the next page, if any.
    pub next: Option<String>,
}

impl PageInfo {
    /// Reads pagination metadata from a response object. Missing fields use defaults.
    pub fn from_object(map: &Map<String, Value>) -> Self {
        let pagination = map.get(PAGINATION_KEY);
        let count = pagination
            .and_then(|p| p.get("count"))
            .and_then(Value::as_u64)
            .unwrap_or(0);
        let next = pagination
            .and_then(|p| p.get("next"))
            .filter(|n| !n.is_null())
            .map(|n| match n {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            });

        Self { count, next }
    }

    /// Returns true if the server signalled another page.
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

/// One page of a list response, split into its parts.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Name of the key holding the records.
    pub data_key: String,
    /// Records in arrival order.
    pub records: Vec<Value>,
    /// Pagination metadata.
    pub info: PageInfo,
    /// Request echo, if present.
    pub request: Option<Value>,
}

impl Page {
    /// Splits a response object into a page, discovering its data key.
    pub fn from_object(map: Map<String, Value>) -> Result<Self, PaginationError> {
        let data_key = discover_data_key(&map)?;
        Self::with_data_key(map, &data_key, 1)
    }

    /// Splits a response object using an already known data key.
    ///
    /// `page_number` is only used for error reporting.
    pub fn with_data_key(
        mut map: Map<String, Value>,
        data_key: &str,
        page_number: u32,
    ) -> Result<Self, PaginationError> {
        let info = PageInfo::from_object(&map);
        let records = match map.remove(data_key) {
            Some(Value::Array(records)) => records,
            _ => {
                return Err(PaginationError::InconsistentDataKey {
                    data_key: data_key.to_string(),
                    page: page_number,
                })
            }
        };

        Ok(Self {
            data_key: data_key.to_string(),
            records,
            info,
            request: map.remove(REQUEST_KEY),
        })
    }

    /// Number of records on this page.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the page holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Finds the single key of a response object that is not reserved.
///
/// Only key identity matters; iteration order of the object is irrelevant.
pub fn discover_data_key(map: &Map<String, Value>) -> Result<String, PaginationError> {
    let mut candidates = map
        .keys()
        .filter(|k| !RESERVED_KEYS.contains(&k.as_str()));

    match (candidates.next(), candidates.next()) {
        (Some(key), None) => Ok(key.clone()),
        (None, _) => Err(PaginationError::UnrecognizedShape {
            reason: "response has no data key".to_string(),
        }),
        (Some(first), Some(second)) => Err(PaginationError::UnrecognizedShape {
            reason: format!("response has more than one data key ('{}', '{}')", first, second),
        }),
    }
}
