//! # sfjobs-bulk
//!
//! Salesforce Bulk API 2.0 jobs: create, upload, close, poll, fetch results.
//!
//! ## Features
//!
//! - **Protocol client** - [`BulkApiClient`], one method per remote operation
//! - **Query jobs** - `query` and `queryAll`, results as a [`ResultSet`]
//! - **Ingest jobs** - insert, update, upsert, delete, hardDelete with the
//!   successful / failed / unprocessed result partitions
//! - **Job handles** - [`QueryJob`] and [`IngestJob`] track one job's id,
//!   latest descriptor and lifecycle phase
//! - **Polling** - fixed interval (5 s by default), no backoff, optional
//!   overall deadline
//!
//! ## Example - Bulk Query
//!
//! ```rust,ignore
//! use sfjobs_bulk::BulkApiClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sfjobs_bulk::Error> {
//!     let client = BulkApiClient::from_credentials(&creds)?;
//!
//!     let mut job = client.start_query("SELECT Id, Name FROM Account").await?;
//!     job.poll_status().await?;
//!     let rows = job.get_results().await?;
//!
//!     for record in rows.records() {
//!         println!("{:?}", record.get("Name"));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Example - Bulk Upsert
//!
//! ```rust,ignore
//! use sfjobs_bulk::BulkApiClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sfjobs_bulk::Error> {
//!     let client = BulkApiClient::from_credentials(&creds)?;
//!
//!     let mut job = client.start_upsert("Account", "External_Id__c").await?;
//!     job.upload_data("External_Id__c,Name\nA-1,Acme\n").await?;
//!     job.close().await?;
//!     job.poll_status().await?;
//!
//!     println!("{} failed", job.get_failed_results().await?.len());
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod job;
mod result_set;
mod types;

pub use client::{BulkApiClient, DEFAULT_POLL_INTERVAL};
pub use error::{Error, ErrorKind, Result};
pub use job::{IngestJob, IngestPhase, QueryJob, QueryPhase};
pub use result_set::{Record, ResultSet};
pub use types::*;
