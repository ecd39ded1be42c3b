//! # sfjobs-auth
//!
//! Connection settings and session login for Salesforce Bulk API jobs.
//!
//! ## Security
//!
//! - Passwords, security tokens and session ids are redacted in Debug output
//! - Tracing spans skip credential parameters
//! - Error messages sanitize any credential data
//!
//! ## Flow
//!
//! 1. [`ConnectionSettings::from_json`] parses and validates a JSON document
//!    (`username`, `password`, `security_token`, optional `domain` and
//!    `api_version`) without touching the network.
//! 2. [`SoapLogin::login`] exchanges the settings for a session.
//! 3. [`SalesforceCredentials::transport_context`](Credentials::transport_context)
//!    builds the shared bulk endpoint and auth headers.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sfjobs_auth::{ConnectionSettings, Credentials, SalesforceCredentials};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sfjobs_auth::Error> {
//!     let json = std::fs::read_to_string(".secrets.salesforce.json")?;
//!     let settings = ConnectionSettings::from_json(&json)?;
//!     let creds = SalesforceCredentials::login(&settings).await?;
//!
//!     println!("{}", creds.bulk_api_url());
//!     Ok(())
//! }
//! ```

mod credentials;
mod error;
mod login;
mod settings;

pub use credentials::{Credentials, SalesforceCredentials};
pub use error::{Error, ErrorKind, Result};
pub use login::SoapLogin;
pub use settings::{ConnectionSettings, DEFAULT_DOMAIN};

/// Login host for production orgs.
pub const PRODUCTION_LOGIN_URL: &str = "https://login.salesforce.com";

/// Login host for sandboxes.
pub const SANDBOX_LOGIN_URL: &str = "https://test.salesforce.com";
