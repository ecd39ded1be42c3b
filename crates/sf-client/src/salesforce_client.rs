//! Authenticated transport for Bulk API 2.0 calls.
//!
//! This module provides [`TransportContext`], the read-only pair of bulk base
//! URL and auth headers, and [`SalesforceClient`], which combines it with an
//! HTTP client and offers typed JSON methods.
//!
//! ## Security
//!
//! - The authorization header is redacted in Debug output
//! - Request bodies are skipped in tracing spans

use serde::{de::DeserializeOwned, Serialize};
use tracing::instrument;

use crate::client::SfHttpClient;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::headers::HeaderSet;
use crate::request::RequestBuilder;
use crate::response::Response;

/// Base endpoint and authorization headers shared by every job call.
///
/// The context is immutable once built. Cloning it is cheap and clones share
/// the same header allocation.
#[derive(Debug, Clone)]
pub struct TransportContext {
    bulk_url: String,
    headers: HeaderSet,
}

impl TransportContext {
    /// Create a context from a Bulk API 2.0 base URL
    /// (`{instance}/services/data/v{version}/jobs`) and a header set.
    pub fn new(bulk_url: impl Into<String>, headers: HeaderSet) -> Self {
        Self {
            bulk_url: bulk_url.into().trim_end_matches('/').to_string(),
            headers,
        }
    }

    /// Build the context for an instance URL, API version and session id,
    /// using the default bearer header set.
    pub fn for_session(instance_url: &str, api_version: &str, session_id: &str) -> Result<Self> {
        let bulk_url = format!(
            "{}/services/data/v{}/jobs",
            instance_url.trim_end_matches('/'),
            api_version
        );
        Ok(Self::new(bulk_url, HeaderSet::bearer(session_id)?))
    }

    /// The Bulk API 2.0 base URL, without trailing slash.
    pub fn bulk_base_url(&self) -> &str {
        &self.bulk_url
    }

    /// The shared header set.
    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }
}

/// Salesforce client bound to one [`TransportContext`].
///
/// Designed to be used by the bulk job crate; it knows nothing about jobs
/// itself.
///
/// # Example
///
/// ```rust,ignore
/// use sfjobs_client::{SalesforceClient, TransportContext};
///
/// let context = TransportContext::for_session(
///     "https://na1.salesforce.com",
///     "64.0",
///     "session_id",
/// )?;
/// let client = SalesforceClient::new(context)?;
///
/// let job: serde_json::Value = client.get_json(&client.bulk_url("query/750xx")).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SalesforceClient {
    http: SfHttpClient,
    context: TransportContext,
}

impl SalesforceClient {
    /// Create a new client with default HTTP configuration.
    pub fn new(context: TransportContext) -> Result<Self> {
        Self::with_config(context, ClientConfig::default())
    }

    /// Create a new client with custom HTTP configuration.
    pub fn with_config(context: TransportContext, config: ClientConfig) -> Result<Self> {
        let http = SfHttpClient::new(config)?;
        Ok(Self { http, context })
    }

    /// Get the transport context.
    pub fn context(&self) -> &TransportContext {
        &self.context
    }

    /// Get the shared header set.
    pub fn headers(&self) -> &HeaderSet {
        self.context.headers()
    }

    /// Get the HTTP configuration.
    pub fn config(&self) -> &ClientConfig {
        self.http.config()
    }

    /// Build the Bulk API 2.0 URL for a path.
    ///
    /// Example: `bulk_url("ingest")` -> `{instance}/services/data/v64.0/jobs/ingest`
    pub fn bulk_url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/{}", self.context.bulk_url, path)
    }

    // =========================================================================
    // Base HTTP Methods (seeded with the shared headers)
    // =========================================================================

    /// Create a GET request builder.
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.http.get(url, self.headers())
    }

    /// Create a POST request builder.
    pub fn post(&self, url: &str) -> RequestBuilder {
        self.http.post(url, self.headers())
    }

    /// Create a PATCH request builder.
    pub fn patch(&self, url: &str) -> RequestBuilder {
        self.http.patch(url, self.headers())
    }

    /// Create a PUT request builder.
    pub fn put(&self, url: &str) -> RequestBuilder {
        self.http.put(url, self.headers())
    }

    /// Execute a request and return the checked response.
    pub async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        self.http.execute(request).await
    }

    // =========================================================================
    // Typed JSON Methods
    // =========================================================================

    /// GET request with JSON response deserialization.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.http.execute(self.get(url)).await?;
        response.json().await
    }

    /// POST request with JSON body and response.
    #[instrument(skip(self, body), fields(url = %url))]
    pub async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T> {
        let request = self.post(url).json(body)?;
        let response = self.http.execute(request).await?;
        response.json().await
    }

    /// PATCH request with JSON body; the response body is discarded.
    #[instrument(skip(self, body), fields(url = %url))]
    pub async fn patch_json<B: Serialize>(&self, url: &str, body: &B) -> Result<()> {
        let request = self.patch(url).json(body)?;
        self.http.execute(request).await?;
        Ok(())
    }
}
