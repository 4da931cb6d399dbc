//! # Congress.gov Integration Library
//!
//! An async client for the Congress.gov v3 REST API with:
//! - Bill, amendment and member endpoints with parameter validation
//! - Automatic pagination: bounded limits or `all` records in one response
//! - JSON responses as `serde_json::Value`, other formats as raw bytes
//! - Configuration from code, environment variables or a `.env` file
//! - Request metrics and `tracing` instrumentation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use integrations_congress::{CongressClient, Limit, ListOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CongressClient::builder()
//!         .api_key("your-api-key")
//!         .build()?;
//!
//!     // First 20 bills of the 118th Congress
//!     let bills = client.bills().list_by_congress(Some(118), &ListOptions::new()).await?;
//!     println!("{} bills in total", bills.total_count().unwrap_or(0));
//!
//!     // Every action on H.R. 3076, across as many pages as needed
//!     let actions = client
//!         .bills()
//!         .actions("hr", 3076, Some(117), &ListOptions::new().limit(Limit::All))
//!         .await?;
//!     println!("{} actions", actions.records().map_or(0, |r| r.len()));
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod errors;
pub mod types;

// HTTP client and transport
pub mod client;
pub mod transport;

// Pagination handling
pub mod pagination;

// API Services
pub mod services;
pub mod validation;

// Observability
pub mod observability;

// Mocks for testing
pub mod mocks;

// Re-exports for convenience
pub use client::{CongressClient, CongressClientBuilder};
pub use config::{CongressConfig, CongressConfigBuilder, ResponseFormat};
pub use errors::{
    ConfigurationError, CongressError, CongressResult, PaginationError, TransportError, TransportErrorKind,
    ValidationError,
};
pub use pagination::{Limit, Paginator, MAX_LIMIT};
pub use services::{AmendmentsService, BillsService, ListOptions, MembersService};
pub use transport::{HttpTransport, ReqwestTransport};
pub use types::{ApiResponse, QueryParams};
pub use validation::{AmendmentType, BillType};
