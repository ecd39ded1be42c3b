//! Stateful job handles.
//!
//! A handle binds one job id to a [`BulkApiClient`] and caches the most recent
//! [`JobDescriptor`]. The id never changes; the descriptor is replaced whole by
//! each poll.
//!
//! Result accessors do not check the local phase. Asking for results of a job
//! that is not finished yet is answered by the service, usually with an HTTP
//! 400 surfaced as [`ErrorKind::RemoteRequest`](crate::ErrorKind::RemoteRequest).

use tracing::{debug, instrument};

use crate::client::BulkApiClient;
use crate::error::Result;
use crate::result_set::ResultSet;
use crate::types::{BulkOperation, JobDescriptor, JobState};

/// Lifecycle position of a [`QueryJob`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPhase {
    /// Created; the service is running the query.
    Submitted,
    /// A poll loop is in flight.
    Polling,
    /// A poll returned a terminal state.
    Terminal,
}

/// Lifecycle position of an [`IngestJob`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestPhase {
    /// Created and open for uploads.
    Created,
    /// At least one batch was uploaded.
    DataUploaded,
    /// Upload marked complete; the service is processing.
    Closed,
    /// A poll loop is in flight.
    Polling,
    /// A poll returned a terminal state.
    Terminal,
}

/// Handle to a Bulk API 2.0 query job.
///
/// # Example
///
/// ```rust,ignore
/// let mut job = client.start_query("SELECT Id, Name FROM Account").await?;
/// job.poll_status().await?;
/// if job.state().is_success() {
///     let rows = job.get_results().await?;
///     println!("{} accounts", rows.len());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct QueryJob {
    client: BulkApiClient,
    id: String,
    descriptor: JobDescriptor,
    phase: QueryPhase,
}

impl QueryJob {
    /// Create a query job (`queryAll` when `include_all` is set).
    pub async fn create(client: BulkApiClient, soql: &str, include_all: bool) -> Result<Self> {
        let descriptor = client.create_query_job(soql, include_all).await?;
        Ok(Self::from_descriptor(client, descriptor))
    }

    /// Wrap the creation response of a query job.
    pub fn from_descriptor(client: BulkApiClient, descriptor: JobDescriptor) -> Self {
        let phase = if descriptor.state().is_terminal() {
            QueryPhase::Terminal
        } else {
            QueryPhase::Submitted
        };
        Self {
            client,
            id: descriptor.id().to_string(),
            descriptor,
            phase,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The descriptor from creation or from the last poll.
    pub fn descriptor(&self) -> &JobDescriptor {
        &self.descriptor
    }

    /// Cached state; only refreshed by [`poll_status`](Self::poll_status).
    pub fn state(&self) -> &JobState {
        self.descriptor.state()
    }

    pub fn phase(&self) -> QueryPhase {
        self.phase
    }

    /// Poll until the job is terminal and cache the final descriptor.
    ///
    /// On error the previous descriptor and phase are kept.
    #[instrument(skip(self), fields(job_id = %self.id))]
    pub async fn poll_status(&mut self) -> Result<&JobDescriptor> {
        let previous = std::mem::replace(&mut self.phase, QueryPhase::Polling);
        match self.client.poll_query_job(&self.id).await {
            Ok(descriptor) => {
                self.descriptor = descriptor;
                self.phase = QueryPhase::Terminal;
                Ok(&self.descriptor)
            }
            Err(err) => {
                self.phase = previous;
                Err(err)
            }
        }
    }

    /// Fetch the query results. See the module docs on preconditions.
    pub async fn get_results(&self) -> Result<ResultSet> {
        self.client.get_query_job_results(&self.id).await
    }
}

/// Handle to a Bulk API 2.0 ingest job.
///
/// # Example
///
/// ```rust,ignore
/// let mut job = client.start_insert("Account").await?;
/// job.upload_data("Name\nAcme\n").await?;
/// job.close().await?;
/// job.poll_status().await?;
/// let created = job.get_successful_results().await?;
/// ```
#[derive(Debug, Clone)]
pub struct IngestJob {
    client: BulkApiClient,
    id: String,
    descriptor: JobDescriptor,
    phase: IngestPhase,
}

impl IngestJob {
    /// Create an ingest job. Upserts need `external_id_field`.
    pub async fn create(
        client: BulkApiClient,
        object: &str,
        operation: BulkOperation,
        external_id_field: Option<&str>,
    ) -> Result<Self> {
        let descriptor = client
            .create_ingest_job(object, operation, external_id_field)
            .await?;
        Ok(Self::from_descriptor(client, descriptor))
    }

    /// Wrap the creation response of an ingest job.
    pub fn from_descriptor(client: BulkApiClient, descriptor: JobDescriptor) -> Self {
        let phase = if descriptor.state().is_terminal() {
            IngestPhase::Terminal
        } else {
            IngestPhase::Created
        };
        Self {
            client,
            id: descriptor.id().to_string(),
            descriptor,
            phase,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The descriptor from creation or from the last poll.
    pub fn descriptor(&self) -> &JobDescriptor {
        &self.descriptor
    }

    /// Cached state; only refreshed by [`poll_status`](Self::poll_status).
    pub fn state(&self) -> &JobState {
        self.descriptor.state()
    }

    pub fn phase(&self) -> IngestPhase {
        self.phase
    }

    /// Upload one CSV batch. Every call is a separate upload.
    #[instrument(skip(self, csv_data), fields(job_id = %self.id))]
    pub async fn upload_data(&mut self, csv_data: &str) -> Result<()> {
        self.client.upload_job_data(&self.id, csv_data).await?;
        if self.phase == IngestPhase::Created {
            self.phase = IngestPhase::DataUploaded;
        }
        Ok(())
    }

    /// Signal that all data has been uploaded.
    #[instrument(skip(self), fields(job_id = %self.id))]
    pub async fn close(&mut self) -> Result<()> {
        self.client.mark_job_upload_complete(&self.id).await?;
        if matches!(self.phase, IngestPhase::Created | IngestPhase::DataUploaded) {
            self.phase = IngestPhase::Closed;
        }
        debug!(phase = ?self.phase, "Closed ingest job");
        Ok(())
    }

    /// Poll until the job is terminal and cache the final descriptor.
    ///
    /// On error the previous descriptor and phase are kept.
    #[instrument(skip(self), fields(job_id = %self.id))]
    pub async fn poll_status(&mut self) -> Result<&JobDescriptor> {
        let previous = std::mem::replace(&mut self.phase, IngestPhase::Polling);
        match self.client.poll_ingest_job(&self.id).await {
            Ok(descriptor) => {
                self.descriptor = descriptor;
                self.phase = IngestPhase::Terminal;
                Ok(&self.descriptor)
            }
            Err(err) => {
                self.phase = previous;
                Err(err)
            }
        }
    }

    /// Records processed successfully.
    pub async fn get_successful_results(&self) -> Result<ResultSet> {
        self.client.get_successful_results(&self.id).await
    }

    /// Records that failed, with `sf__Error` explaining why.
    pub async fn get_failed_results(&self) -> Result<ResultSet> {
        self.client.get_failed_results(&self.id).await
    }

    /// Records never processed.
    pub async fn get_unprocessed_records(&self) -> Result<ResultSet> {
        self.client.get_unprocessed_records(&self.id).await
    }
}
