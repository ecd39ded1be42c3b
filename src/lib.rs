//! # sfjobs
//!
//! Salesforce Bulk API 2.0 job client for Rust.
//!
//! ## Security
//!
//! - Passwords, security tokens and session ids are redacted in Debug output
//! - Tracing spans skip credential parameters and request bodies
//! - Error bodies have tokens and session ids scrubbed
//!
//! ## Crates
//!
//! - **sfjobs-client** - HTTP transport: shared header set, timeouts, status mapping
//! - **sfjobs-auth** - Connection settings (JSON) and username/password login
//! - **sfjobs-bulk** - Bulk API 2.0 protocol client, job handles, CSV result sets
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! #[tokio::main]
//! async fn main() -> Result<(), sfjobs::bulk::Error> {
//!     let json = std::fs::read_to_string(".secrets.salesforce.json")
//!         .expect("secrets file");
//!     let client = sfjobs::connect_from_json(&json).await?;
//!
//!     let mut job = client.start_insert("Account").await?;
//!     job.upload_data("Name\nAcme\n").await?;
//!     job.close().await?;
//!     job.poll_status().await?;
//!
//!     let created = job.get_successful_results().await?;
//!     println!("created {} accounts", created.len());
//!     Ok(())
//! }
//! ```

// Re-export all crates for convenient access
pub use sfjobs_auth as auth;
pub use sfjobs_bulk as bulk;
pub use sfjobs_client as client;

// Re-export commonly used types at the top level
pub use sfjobs_auth::{ConnectionSettings, Credentials, SalesforceCredentials, SoapLogin};
pub use sfjobs_bulk::{
    BulkApiClient, BulkOperation, IngestJob, JobDescriptor, JobState, QueryJob, ResultSet,
};
pub use sfjobs_client::{ClientConfig, SalesforceClient, TransportContext};

/// Parse connection settings, log in, and build a [`BulkApiClient`].
///
/// Invalid settings fail with
/// [`ErrorKind::Configuration`](sfjobs_bulk::ErrorKind::Configuration) before
/// any request is sent.
pub async fn connect_from_json(json: &str) -> bulk::Result<BulkApiClient> {
    let settings = ConnectionSettings::from_json(json)?;
    connect_with(&settings, &SoapLogin::new()?).await
}

/// Log in with an explicit [`SoapLogin`] and build a [`BulkApiClient`].
pub async fn connect_with(
    settings: &ConnectionSettings,
    login: &SoapLogin,
) -> bulk::Result<BulkApiClient> {
    let credentials = login.login(settings).await?;
    BulkApiClient::from_credentials(&credentials)
}
