//! Observability: request metrics and tracing hooks.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the application.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Metrics collector for Congress.gov API operations.
#[derive(Debug, Default)]
pub struct Metrics {
    /// Total HTTP requests made.
    requests_total: AtomicU64,
    /// Successful HTTP requests.
    requests_success: AtomicU64,
    /// Failed HTTP requests.
    requests_failed: AtomicU64,
    /// Pages fetched by `all` requests after the first.
    pages_followed: AtomicU64,
    /// Total request latency in microseconds.
    latency_total_us: AtomicU64,
    /// Request count for latency calculation.
    latency_count: AtomicU64,
}

impl Metrics {
    /// Creates a new metrics collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a request.
    pub fn record_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a successful request.
    pub fn record_success(&self) {
        self.requests_success.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed request.
    pub fn record_failure(&self) {
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a followed `next` page.
    pub fn record_page_followed(&self) {
        self.pages_followed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records request latency.
    pub fn record_latency(&self, duration: Duration) {
        let us = duration.as_micros() as u64;
        self.latency_total_us.fetch_add(us, Ordering::Relaxed);
        self.latency_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Gets the total request count.
    pub fn total_requests(&self) -> u64 {
        self.requests_total.load(Ordering::Relaxed)
    }

    /// Gets the successful request count.
    pub fn successful_requests(&self) -> u64 {
        self.requests_success.load(Ordering::Relaxed)
    }

    /// Gets the failed request count.
    pub fn failed_requests(&self) -> u64 {
        self.requests_failed.load(Ordering::Relaxed)
    }

    /// Gets the followed page count.
    pub fn pages_followed(&self) -> u64 {
        self.pages_followed.load(Ordering::Relaxed)
    }

    /// Gets the average latency in microseconds.
    pub fn average_latency_us(&self) -> u64 {
        let total = self.latency_total_us.load(Ordering::Relaxed);
        let count = self.latency_count.load(Ordering::Relaxed);
        if count == 0 {
            0
        } else {
            total / count
        }
    }

    /// Gets a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_total: self.total_requests(),
            requests_success: self.successful_requests(),
            requests_failed: self.failed_requests(),
            pages_followed: self.pages_followed(),
            average_latency_us: self.average_latency_us(),
        }
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Total requests.
    pub requests_total: u64,
    /// Successful requests.
    pub requests_success: u64,
    /// Failed requests.
    pub requests_failed: u64,
    /// Followed pages.
    pub pages_followed: u64,
    /// Average latency in microseconds.
    pub average_latency_us: u64,
}

/// Request timer for measuring latency.
pub struct RequestTimer {
    start: Instant,
    metrics: Arc<Metrics>,
}

impl RequestTimer {
    /// Creates a new request timer and counts the request.
    pub fn new(metrics: Arc<Metrics>) -> Self {
        metrics.record_request();
        Self {
            start: Instant::now(),
            metrics,
        }
    }

    /// Records success and latency.
    pub fn success(self) -> Duration {
        let elapsed = self.start.elapsed();
        self.metrics.record_success();
        self.metrics.record_latency(elapsed);
        elapsed
    }

    /// Records failure and latency.
    pub fn failure(self) -> Duration {
        let elapsed = self.start.elapsed();
        self.metrics.record_failure();
        self.metrics.record_latency(elapsed);
        elapsed
    }
}

/// Tracing hooks for API operations.
pub struct TracingHooks;

impl TracingHooks {
    /// Logs the start of an API request.
    pub fn on_request_start(url: &str) {
        debug!(url = %url, "Congress API request started");
    }

    /// Logs the completion of an API request.
    pub fn on_request_complete(url: &str, status: u16, duration: Duration) {
        info!(
            url = %url,
            status = status,
            duration_ms = duration.as_millis() as u64,
            "Congress API request completed"
        );
    }

    /// Logs a request error.
    pub fn on_request_error(url: &str, error: &str) {
        error!(url = %url, error = %error, "Congress API request failed");
    }

    /// Logs a fetched page during an `all` request.
    pub fn on_page_fetched(path: &str, page: u32, records: usize, offset: u64) {
        debug!(
            path = %path,
            page = page,
            records = records,
            offset = offset,
            "Fetched page"
        );
    }

    /// Logs the end of an `all` request.
    pub fn on_pagination_complete(path: &str, pages: u32, records: usize, total_count: u64) {
        debug!(
            path = %path,
            pages = pages,
            records = records,
            total_count = total_count,
            "Pagination complete"
        );
    }

    /// Logs a page ceiling hit.
    pub fn on_page_limit_exceeded(path: &str, max_pages: u32) {
        warn!(path = %path, max_pages = max_pages, "Page ceiling reached before last page");
    }
}

/// Strips an `api_key` query parameter from a URL before logging it.
pub fn redact_url(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(mut parsed) => {
            let pairs: Vec<(String, String)> = parsed
                .query_pairs()
                .map(|(k, v)| {
                    if k.eq_ignore_ascii_case("api_key") {
                        (k.into_owned(), "[REDACTED]".to_string())
                    } else {
                        (k.into_owned(), v.into_owned())
                    }
                })
                .collect();
            if pairs.is_empty() {
                parsed.set_query(None);
            } else {
                parsed.query_pairs_mut().clear().extend_pairs(pairs);
            }
            parsed.to_string()
        }
        Err(_) => url.to_string(),
    }
}
