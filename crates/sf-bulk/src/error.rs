//! Error types for sfjobs-bulk.
//!
//! Every failure surfaces as one of five kinds. Polling never produces an
//! error for a `Failed` or `Aborted` job; those are ordinary terminal states.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    pub kind: ErrorKind,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation(message.into()))
    }

    /// Returns true for argument errors raised before any request was sent.
    pub fn is_validation(&self) -> bool {
        matches!(self.kind, ErrorKind::Validation(_))
    }

    /// Returns true for non-2xx responses and transport faults.
    pub fn is_remote_request(&self) -> bool {
        matches!(self.kind, ErrorKind::RemoteRequest { .. })
    }

    /// HTTP status of a failed remote request, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self.kind {
            ErrorKind::RemoteRequest { status, .. } => status,
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Connection settings could not be loaded or the login was refused.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// An argument was rejected before any network activity.
    #[error("Validation error: {0}")]
    Validation(String),
    /// Non-success HTTP status (`status` set) or transport fault (`status` unset).
    #[error("Remote request failed: {}", describe_remote(.status, .body))]
    RemoteRequest { status: Option<u16>, body: String },
    /// A response body was not valid UTF-8, CSV or JSON.
    #[error("Data format error: {0}")]
    DataFormat(String),
    /// The job did not reach a terminal state within the configured wait.
    #[error("Timeout: {0}")]
    Timeout(String),
}

fn describe_remote(status: &Option<u16>, body: &str) -> String {
    match status {
        Some(status) if body.is_empty() => format!("HTTP {}", status),
        Some(status) => format!("HTTP {} {}", status, body),
        None => body.to_string(),
    }
}

impl From<sfjobs_client::Error> for Error {
    fn from(err: sfjobs_client::Error) -> Self {
        use sfjobs_client::ErrorKind as Client;

        let kind = match &err.kind {
            Client::Http { status, body } => ErrorKind::RemoteRequest {
                status: Some(*status),
                body: body.clone(),
            },
            Client::Timeout | Client::Connection(_) | Client::Transfer(_) | Client::Other(_) => {
                ErrorKind::RemoteRequest {
                    status: None,
                    body: err.to_string(),
                }
            }
            Client::Json(_) | Client::Encoding(_) => ErrorKind::DataFormat(err.to_string()),
            Client::Config(_) | Client::InvalidHeader(_) => {
                ErrorKind::Configuration(err.to_string())
            }
        };
        Error::with_source(kind, err)
    }
}

impl From<sfjobs_auth::Error> for Error {
    fn from(err: sfjobs_auth::Error) -> Self {
        use sfjobs_auth::ErrorKind as Auth;

        let kind = match &err.kind {
            Auth::Config(_) | Auth::Io(_) | Auth::Other(_) => {
                ErrorKind::Configuration(err.to_string())
            }
            Auth::Login { .. } | Auth::Http(_) | Auth::InvalidResponse(_) => {
                let status = err
                    .source
                    .as_deref()
                    .and_then(|source| source.downcast_ref::<sfjobs_client::Error>())
                    .and_then(sfjobs_client::Error::status);
                ErrorKind::RemoteRequest {
                    status,
                    body: err.to_string(),
                }
            }
        };
        Error::with_source(kind, err)
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::with_source(ErrorKind::DataFormat(err.to_string()), err)
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Self {
        Error::with_source(
            ErrorKind::DataFormat(format!("result body is not valid UTF-8: {}", err)),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_maps_to_remote_request() {
        let client_err = sfjobs_client::Error::new(sfjobs_client::ErrorKind::Http {
            status: 400,
            body: r#"[{"errorCode":"INVALIDJOB"}]"#.to_string(),
        });
        let err: Error = client_err.into();

        assert!(err.is_remote_request());
        assert_eq!(err.status(), Some(400));
        assert!(err.to_string().contains("HTTP 400"));
        assert!(err.to_string().contains("INVALIDJOB"));
    }

    #[test]
    fn test_transport_fault_has_no_status() {
        let err: Error = sfjobs_client::Error::new(sfjobs_client::ErrorKind::Timeout).into();
        assert!(err.is_remote_request());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_json_decode_maps_to_data_format() {
        let err: Error =
            sfjobs_client::Error::new(sfjobs_client::ErrorKind::Json("EOF".into())).into();
        assert!(matches!(err.kind, ErrorKind::DataFormat(_)));
    }

    #[test]
    fn test_auth_config_maps_to_configuration() {
        let auth_err = sfjobs_auth::ConnectionSettings::from_json("{}").unwrap_err();
        let err: Error = auth_err.into();
        assert!(matches!(err.kind, ErrorKind::Configuration(_)));
    }

    #[test]
    fn test_validation_helper() {
        let err = Error::validation("external id field is required");
        assert!(err.is_validation());
        assert!(!err.is_remote_request());
        assert_eq!(
            err.to_string(),
            "Validation error: external id field is required"
        );
    }
}
