//! Connection settings loaded from a JSON document.
//!
//! ```json
//! {
//!   "username": "user@example.com",
//!   "password": "hunter2",
//!   "security_token": "XXXXXXXX",
//!   "domain": "login",
//!   "api_version": "64.0"
//! }
//! ```
//!
//! `domain` defaults to `"login"` and `api_version` to `"64.0"`. Everything is
//! validated before any network activity.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, ErrorKind, Result};

/// Default login domain (`https://login.salesforce.com`).
pub const DEFAULT_DOMAIN: &str = "login";

fn default_domain() -> String {
    DEFAULT_DOMAIN.to_string()
}

fn default_api_version() -> String {
    sfjobs_client::DEFAULT_API_VERSION.to_string()
}

/// Username/password connection settings.
///
/// `password` and `security_token` are redacted in Debug output. Keys other
/// than the five below are ignored, so a secrets file may carry extra entries.
#[derive(Clone, Deserialize)]
pub struct ConnectionSettings {
    username: String,
    password: String,
    security_token: String,
    #[serde(default = "default_domain")]
    domain: String,
    #[serde(default = "default_api_version")]
    api_version: String,
}

impl std::fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("security_token", &"[REDACTED]")
            .field("domain", &self.domain)
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl ConnectionSettings {
    /// Create settings with the default domain and API version.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        security_token: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            security_token: security_token.into(),
            domain: default_domain(),
            api_version: default_api_version(),
        }
    }

    /// Set the login domain (`login`, `test`, or a My Domain prefix).
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Set the API version (e.g. `"64.0"`).
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Parse and validate settings from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        if json.trim().is_empty() {
            return Err(Error::new(ErrorKind::Config(
                "no JSON document was provided".to_string(),
            )));
        }

        let settings: Self = serde_json::from_str(json).map_err(|e| {
            // serde_json messages name fields and positions, never values
            Error::with_source(
                ErrorKind::Config(format!("invalid connection settings: {}", e)),
                e,
            )
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Read, parse and validate settings from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    /// Check field contents that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(config_error("username must not be empty"));
        }
        if self.domain.trim().is_empty() || self.domain.contains(['/', ':', ' ']) {
            return Err(config_error(
                "domain must be a host prefix such as 'login' or 'test'",
            ));
        }
        if !is_api_version(&self.api_version) {
            return Err(config_error("api_version must look like '64.0'"));
        }
        Ok(())
    }

    /// Username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Login domain.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// API version.
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Password followed by the security token, as the login call expects.
    pub(crate) fn password_with_token(&self) -> String {
        format!("{}{}", self.password, self.security_token)
    }

    /// The login host URL for the configured domain.
    ///
    /// `login` -> `https://login.salesforce.com`; a domain that already ends in
    /// `.salesforce.com` is used as the host verbatim.
    pub fn login_url(&self) -> String {
        if self.domain.ends_with(".salesforce.com") {
            format!("https://{}", self.domain)
        } else {
            format!("https://{}.salesforce.com", self.domain)
        }
    }
}

fn config_error(message: &str) -> Error {
    Error::new(ErrorKind::Config(message.to_string()))
}

/// `major.minor`, both numeric.
fn is_api_version(version: &str) -> bool {
    match version.split_once('.') {
        Some((major, minor)) => {
            !major.is_empty()
                && !minor.is_empty()
                && major.chars().all(|c| c.is_ascii_digit())
                && minor.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}
