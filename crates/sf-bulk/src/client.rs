//! Bulk API 2.0 job protocol client.
//!
//! One method per remote operation, each a single round trip, plus the
//! status polling loops. The handle constructors at the bottom wrap the
//! creation calls in [`QueryJob`] / [`IngestJob`].

use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::{debug, info, instrument};

use sfjobs_auth::Credentials;
use sfjobs_client::security::{names, url};
use sfjobs_client::{ClientConfig, SalesforceClient, TransportContext};

use crate::error::{Error, ErrorKind, Result};
use crate::job::{IngestJob, QueryJob};
use crate::result_set::ResultSet;
use crate::types::*;

/// Default polling interval for job status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

const QUERY: &str = "query";
const INGEST: &str = "ingest";

/// Salesforce Bulk API 2.0 client.
///
/// Provides the raw protocol operations for Bulk API 2.0:
/// - Create, monitor and poll query jobs, fetch their results
/// - Create ingest jobs, upload data, close, poll, fetch the three result
///   partitions
///
/// Requests are never retried. A non-success status or transport fault comes
/// back as [`ErrorKind::RemoteRequest`].
///
/// # Example
///
/// ```rust,ignore
/// use sfjobs_bulk::{BulkApiClient, BulkOperation};
///
/// let client = BulkApiClient::from_credentials(&creds)?;
///
/// let job = client.create_ingest_job("Account", BulkOperation::Insert, None).await?;
/// client.upload_job_data(job.id(), "Name\nTest Account 1\nTest Account 2\n").await?;
/// client.mark_job_upload_complete(job.id()).await?;
/// let completed = client.poll_ingest_job(job.id()).await?;
/// let ok = client.get_successful_results(completed.id()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct BulkApiClient {
    client: SalesforceClient,
    poll_interval: Duration,
    max_wait: Option<Duration>,
}

impl BulkApiClient {
    /// Create a new Bulk API client for a transport context.
    pub fn new(context: TransportContext) -> Result<Self> {
        Ok(Self::from_client(SalesforceClient::new(context)?))
    }

    /// Create a new Bulk API client with custom HTTP configuration.
    pub fn with_config(context: TransportContext, config: ClientConfig) -> Result<Self> {
        Ok(Self::from_client(SalesforceClient::with_config(
            context, config,
        )?))
    }

    /// Create a Bulk API client from an existing SalesforceClient.
    pub fn from_client(client: SalesforceClient) -> Self {
        Self {
            client,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_wait: None,
        }
    }

    /// Create a Bulk API client for an authenticated session.
    pub fn from_credentials(credentials: &impl Credentials) -> Result<Self> {
        Self::new(credentials.transport_context()?)
    }

    /// Get the underlying SalesforceClient.
    pub fn inner(&self) -> &SalesforceClient {
        &self.client
    }

    /// The Bulk API 2.0 base URL.
    pub fn bulk_base_url(&self) -> &str {
        self.client.context().bulk_base_url()
    }

    /// Set the delay between two status calls of a poll loop.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Give up polling with [`ErrorKind::Timeout`] once `max_wait` has
    /// elapsed. Polling is unbounded unless this is set.
    ///
    /// The wait before the last status call is shortened to end on the
    /// deadline, so a poll overruns `max_wait` by at most one status request.
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn max_wait(&self) -> Option<Duration> {
        self.max_wait
    }

    fn job_url(&self, family: &str, job_id: &str, suffix: Option<&str>) -> Result<String> {
        if job_id.trim().is_empty() {
            return Err(Error::validation("job id must not be empty"));
        }
        let path = match suffix {
            Some(suffix) => format!("{}/{}/{}", family, url::encode_param(job_id), suffix),
            None => format!("{}/{}", family, url::encode_param(job_id)),
        };
        Ok(self.client.bulk_url(&path))
    }

    // =========================================================================
    // Query Job Operations
    // =========================================================================

    /// Create a query job (`queryAll` when `include_all` is set).
    #[instrument(skip(self, soql))]
    pub async fn create_query_job(&self, soql: &str, include_all: bool) -> Result<JobDescriptor> {
        if soql.trim().is_empty() {
            return Err(Error::validation("query must not be empty"));
        }

        let mut request = CreateQueryJobRequest::new(soql);
        if include_all {
            request = request.with_query_all();
        }

        let url = self.client.bulk_url(QUERY);
        let job: JobDescriptor = self.client.post_json(&url, &request).await?;
        info!(job_id = %job.id(), state = %job.state(), "Created query job");
        Ok(job)
    }

    /// Get query job status.
    #[instrument(skip(self))]
    pub async fn get_query_job_status(&self, job_id: &str) -> Result<JobDescriptor> {
        self.get_job_status(QUERY, job_id).await
    }

    /// Poll a query job until it reaches a terminal state.
    #[instrument(skip(self))]
    pub async fn poll_query_job(&self, job_id: &str) -> Result<JobDescriptor> {
        self.poll_until_terminal(QUERY, job_id).await
    }

    /// Fetch the results of a query job.
    ///
    /// Nothing is checked locally: asking before the job is complete returns
    /// whatever error the service answers with.
    #[instrument(skip(self))]
    pub async fn get_query_job_results(&self, job_id: &str) -> Result<ResultSet> {
        let url = self.job_url(QUERY, job_id, Some("results"))?;
        self.get_result_set(&url).await
    }

    // =========================================================================
    // Ingest Job Operations
    // =========================================================================

    /// Create an ingest job.
    ///
    /// `external_id_field` is required for [`BulkOperation::Upsert`] and not
    /// sent for any other operation. Argument errors are reported as
    /// [`ErrorKind::Validation`] before any request is made.
    #[instrument(skip(self))]
    pub async fn create_ingest_job(
        &self,
        object: &str,
        operation: BulkOperation,
        external_id_field: Option<&str>,
    ) -> Result<JobDescriptor> {
        if operation.is_query() {
            return Err(Error::validation(format!(
                "{} is a query operation; use create_query_job",
                operation
            )));
        }
        if !names::is_safe_api_name(object) {
            return Err(Error::validation(format!(
                "invalid object name {:?}",
                object
            )));
        }

        let mut request = CreateIngestJobRequest::new(object, operation);
        if operation == BulkOperation::Upsert {
            let field = external_id_field
                .map(str::trim)
                .filter(|field| !field.is_empty())
                .ok_or_else(|| {
                    Error::validation("upsert requires an external id field name")
                })?;
            if !names::is_safe_api_name(field) {
                return Err(Error::validation(format!(
                    "invalid external id field name {:?}",
                    field
                )));
            }
            request = request.with_external_id_field(field);
        } else if external_id_field.is_some() {
            debug!(%operation, "Ignoring external id field for non-upsert operation");
        }

        let url = self.client.bulk_url(INGEST);
        let job: JobDescriptor = self.client.post_json(&url, &request).await?;
        info!(job_id = %job.id(), state = %job.state(), "Created ingest job");
        Ok(job)
    }

    /// Upload one CSV batch to an ingest job.
    ///
    /// The request carries `Content-Type: text/csv` on a private copy of the
    /// shared headers.
    #[instrument(skip(self, csv_data), fields(bytes = csv_data.len()))]
    pub async fn upload_job_data(&self, job_id: &str, csv_data: &str) -> Result<()> {
        let url = self.job_url(INGEST, job_id, Some("batches"))?;
        let request = self.client.put(&url).csv(csv_data);
        self.client.execute(request).await?;
        debug!("Uploaded job data");
        Ok(())
    }

    /// Mark an ingest job's upload as complete so processing starts.
    #[instrument(skip(self))]
    pub async fn mark_job_upload_complete(&self, job_id: &str) -> Result<()> {
        let url = self.job_url(INGEST, job_id, None)?;
        self.client
            .patch_json(&url, &UpdateJobStateRequest::upload_complete())
            .await?;
        info!("Marked upload complete");
        Ok(())
    }

    /// Get ingest job status.
    #[instrument(skip(self))]
    pub async fn get_ingest_job_status(&self, job_id: &str) -> Result<JobDescriptor> {
        self.get_job_status(INGEST, job_id).await
    }

    /// Poll an ingest job until it reaches a terminal state.
    #[instrument(skip(self))]
    pub async fn poll_ingest_job(&self, job_id: &str) -> Result<JobDescriptor> {
        self.poll_until_terminal(INGEST, job_id).await
    }

    /// Records the job processed successfully.
    #[instrument(skip(self))]
    pub async fn get_successful_results(&self, job_id: &str) -> Result<ResultSet> {
        let url = self.job_url(INGEST, job_id, Some("successfulResults"))?;
        self.get_result_set(&url).await
    }

    /// Records the job failed to process.
    #[instrument(skip(self))]
    pub async fn get_failed_results(&self, job_id: &str) -> Result<ResultSet> {
        let url = self.job_url(INGEST, job_id, Some("failedResults"))?;
        self.get_result_set(&url).await
    }

    /// Records the job never processed (aborted or failed jobs).
    #[instrument(skip(self))]
    pub async fn get_unprocessed_records(&self, job_id: &str) -> Result<ResultSet> {
        let url = self.job_url(INGEST, job_id, Some("unprocessedrecords"))?;
        self.get_result_set(&url).await
    }

    // =========================================================================
    // Shared plumbing
    // =========================================================================

    async fn get_job_status(&self, family: &str, job_id: &str) -> Result<JobDescriptor> {
        let url = self.job_url(family, job_id, None)?;
        let job: JobDescriptor = self.client.get_json(&url).await?;
        debug!(state = %job.state(), "Job status");
        Ok(job)
    }

    async fn poll_until_terminal(&self, family: &str, job_id: &str) -> Result<JobDescriptor> {
        let start = Instant::now();

        loop {
            let job = self.get_job_status(family, job_id).await?;

            if job.state().is_terminal() {
                info!(state = %job.state(), elapsed = ?start.elapsed(), "Job reached terminal state");
                return Ok(job);
            }

            let delay = match self.max_wait {
                Some(max_wait) => {
                    let elapsed = start.elapsed();
                    if elapsed >= max_wait {
                        return Err(Error::new(ErrorKind::Timeout(format!(
                            "job {} still {} after {:?}",
                            job_id,
                            job.state(),
                            max_wait
                        ))));
                    }
                    // Last sleep is cut short so the final check lands on the deadline.
                    self.poll_interval.min(max_wait - elapsed)
                }
                None => self.poll_interval,
            };

            sleep(delay).await;
        }
    }

    async fn get_result_set(&self, url: &str) -> Result<ResultSet> {
        let request = self.client.get(url).accept_csv();
        let response = self.client.execute(request).await?;
        let body = response.bytes().await?;
        let results = ResultSet::from_bytes(&body)?;
        debug!(rows = results.len(), "Fetched results");
        Ok(results)
    }

    // =========================================================================
    // Job handles
    // =========================================================================

    /// Create a `query` job and wrap it in a handle.
    pub async fn start_query(&self, soql: &str) -> Result<QueryJob> {
        let descriptor = self.create_query_job(soql, false).await?;
        Ok(QueryJob::from_descriptor(self.clone(), descriptor))
    }

    /// Create a `queryAll` job (includes deleted and archived records).
    pub async fn start_query_all(&self, soql: &str) -> Result<QueryJob> {
        let descriptor = self.create_query_job(soql, true).await?;
        Ok(QueryJob::from_descriptor(self.clone(), descriptor))
    }

    /// Create an ingest job and wrap it in a handle.
    pub async fn start_ingest(
        &self,
        object: &str,
        operation: BulkOperation,
        external_id_field: Option<&str>,
    ) -> Result<IngestJob> {
        let descriptor = self
            .create_ingest_job(object, operation, external_id_field)
            .await?;
        Ok(IngestJob::from_descriptor(self.clone(), descriptor))
    }

    pub async fn start_insert(&self, object: &str) -> Result<IngestJob> {
        self.start_ingest(object, BulkOperation::Insert, None).await
    }

    pub async fn start_update(&self, object: &str) -> Result<IngestJob> {
        self.start_ingest(object, BulkOperation::Update, None).await
    }

    pub async fn start_upsert(&self, object: &str, external_id_field: &str) -> Result<IngestJob> {
        self.start_ingest(object, BulkOperation::Upsert, Some(external_id_field))
            .await
    }

    pub async fn start_delete(&self, object: &str) -> Result<IngestJob> {
        self.start_ingest(object, BulkOperation::Delete, None).await
    }

    pub async fn start_hard_delete(&self, object: &str) -> Result<IngestJob> {
        self.start_ingest(object, BulkOperation::HardDelete, None)
            .await
    }
}
