//! Credentials trait and implementations.
//!
//! All credential types implement custom Debug to redact sensitive data.

use sfjobs_client::TransportContext;

use crate::error::Result;
use crate::login::SoapLogin;
use crate::settings::ConnectionSettings;

/// Trait for Salesforce credentials.
pub trait Credentials: Send + Sync {
    /// Get the Salesforce instance URL.
    fn instance_url(&self) -> &str;

    /// Get the session id (sent as a bearer token).
    fn session_id(&self) -> &str;

    /// Get the API version (e.g., "64.0").
    fn api_version(&self) -> &str;

    /// Returns true if the credentials appear to be valid (non-empty).
    fn is_valid(&self) -> bool {
        !self.instance_url().is_empty() && !self.session_id().is_empty()
    }

    /// The Bulk API 2.0 base URL: `{instance}/services/data/v{version}/jobs`.
    fn bulk_api_url(&self) -> String {
        format!(
            "{}/services/data/v{}/jobs",
            self.instance_url().trim_end_matches('/'),
            self.api_version()
        )
    }

    /// Build the shared transport context for these credentials.
    fn transport_context(&self) -> Result<TransportContext> {
        Ok(TransportContext::for_session(
            self.instance_url(),
            self.api_version(),
            self.session_id(),
        )?)
    }
}

/// An authenticated Salesforce session.
///
/// The session id is redacted in Debug output to prevent accidental exposure
/// in logs.
#[derive(Clone)]
pub struct SalesforceCredentials {
    instance_url: String,
    session_id: String,
    api_version: String,
}

impl std::fmt::Debug for SalesforceCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SalesforceCredentials")
            .field("instance_url", &self.instance_url)
            .field("session_id", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl SalesforceCredentials {
    /// Create new credentials with the given values.
    pub fn new(
        instance_url: impl Into<String>,
        session_id: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        Self {
            instance_url: instance_url.into().trim_end_matches('/').to_string(),
            session_id: session_id.into(),
            api_version: api_version.into(),
        }
    }

    /// Log in with username/password settings.
    pub async fn login(settings: &ConnectionSettings) -> Result<Self> {
        SoapLogin::new()?.login(settings).await
    }

    /// Parse settings from JSON and log in.
    ///
    /// Invalid JSON fails with [`ErrorKind::Config`](crate::ErrorKind::Config)
    /// before any request is sent.
    pub async fn from_json(json: &str) -> Result<Self> {
        let settings = ConnectionSettings::from_json(json)?;
        Self::login(&settings).await
    }

    /// Set the API version.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }
}

impl Credentials for SalesforceCredentials {
    fn instance_url(&self) -> &str {
        &self.instance_url
    }

    fn session_id(&self) -> &str {
        &self.session_id
    }

    fn api_version(&self) -> &str {
        &self.api_version
    }
}
