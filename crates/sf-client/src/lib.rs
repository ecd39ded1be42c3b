//! # sfjobs-client
//!
//! HTTP transport for Salesforce Bulk API 2.0 jobs.
//!
//! This crate provides the plumbing every bulk job call goes through:
//! - A shared, read-only [`TransportContext`] (bulk base URL + auth headers)
//! - Copy-on-write header overrides via [`HeaderSet`]
//! - A bounded per-request timeout (30s by default)
//! - Non-success responses mapped to typed errors carrying status and body
//! - Request/response tracing
//!
//! There is deliberately no retry layer: a failed request is reported once and
//! the caller decides what to do.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Application Layer                        │
//! │  (sfjobs-bulk: job protocol client and job handles)         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   SalesforceClient                          │
//! │  - Holds the TransportContext + HTTP client                 │
//! │  - Provides typed JSON methods (get_json, post_json, etc.)  │
//! │  - Seeds every request with the shared headers              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    SfHttpClient                             │
//! │  - Raw HTTP with timeouts and compression                   │
//! │  - Status checking and error mapping                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use sfjobs_client::{HeaderSet, SalesforceClient, TransportContext};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sfjobs_client::Error> {
//!     let context = TransportContext::new(
//!         "https://myorg.my.salesforce.com/services/data/v64.0/jobs",
//!         HeaderSet::bearer("session_id")?,
//!     );
//!     let client = SalesforceClient::new(context)?;
//!
//!     let job: serde_json::Value = client.get_json(&client.bulk_url("ingest/750xx")).await?;
//!     println!("{}", job["state"]);
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod headers;
mod request;
mod response;
mod salesforce_client;
pub mod security;

pub use client::SfHttpClient;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{Error, ErrorKind, Result};
pub use headers::HeaderSet;
pub use request::{RequestBody, RequestBuilder, RequestMethod};
pub use response::Response;
pub use salesforce_client::{SalesforceClient, TransportContext};

/// Default Salesforce API version
pub const DEFAULT_API_VERSION: &str = "64.0";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("sfjobs/", env!("CARGO_PKG_VERSION"));
