//! Core HTTP client with timeouts, compression and status checking.

use tracing::{debug, info, instrument};

use crate::config::ClientConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::headers::HeaderSet;
use crate::request::{RequestBody, RequestBuilder, RequestMethod};
use crate::response::Response;

/// HTTP client for Salesforce APIs.
///
/// Every request is sent once: transport faults and non-success statuses are
/// returned as errors without retrying.
#[derive(Debug, Clone)]
pub struct SfHttpClient {
    inner: reqwest::Client,
    config: ClientConfig,
}

impl SfHttpClient {
    /// Create a new HTTP client from the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .gzip(config.accept_compressed)
            .deflate(config.accept_compressed)
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;

        Ok(Self { inner, config })
    }

    /// Create a new HTTP client with default configuration.
    pub fn default_client() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Create a GET request builder.
    pub fn get(&self, url: impl Into<String>, headers: &HeaderSet) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Get, url, headers.clone())
    }

    /// Create a POST request builder.
    pub fn post(&self, url: impl Into<String>, headers: &HeaderSet) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Post, url, headers.clone())
    }

    /// Create a PATCH request builder.
    pub fn patch(&self, url: impl Into<String>, headers: &HeaderSet) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Patch, url, headers.clone())
    }

    /// Create a PUT request builder.
    pub fn put(&self, url: impl Into<String>, headers: &HeaderSet) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Put, url, headers.clone())
    }

    /// Execute a request, failing with [`ErrorKind::Http`] on any non-2xx status.
    #[instrument(skip(self, request), fields(method = ?request.method, url = %request.url))]
    pub async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let response = self.execute_once(request).await?;
        response.error_for_status().await
    }

    /// Send a request and wrap whatever status comes back.
    async fn execute_once(&self, request: RequestBuilder) -> Result<Response> {
        let RequestBuilder {
            method,
            url,
            headers,
            body,
        } = request;

        let mut req = self
            .inner
            .request(method.to_reqwest(), &url)
            .headers(headers.as_map().clone());

        if let Some(body) = body {
            req = match body {
                RequestBody::Json(value) => req.body(serde_json::to_vec(&value)?),
                RequestBody::Bytes(bytes) => req.body(bytes),
            };
        }

        if self.config.enable_tracing {
            debug!(method = ?method, url = %url, "Sending request");
        }

        let response = req.send().await?;

        if self.config.enable_tracing {
            let status = response.status().as_u16();
            let content_length = response.content_length();

            if response.status().is_success() {
                debug!(status, content_length, "Response received");
            } else {
                info!(status, content_length, "Non-success response");
            }
        }

        Ok(Response::new(response))
    }
}
