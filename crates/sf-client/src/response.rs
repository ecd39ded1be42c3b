//! HTTP response handling.

use std::sync::LazyLock;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Error, ErrorKind, Result};

/// Salesforce access tokens / session ids: org id prefix, `!`, opaque tail.
static TOKEN_PATTERN: LazyLock<regex_lite::Regex> =
    LazyLock::new(|| regex_lite::Regex::new(r"00[A-Za-z0-9]{13,}[!][A-Za-z0-9_.]+").unwrap());

static SESSION_PATTERN: LazyLock<regex_lite::Regex> =
    LazyLock::new(|| regex_lite::Regex::new(r"sid=[A-Za-z0-9]{20,}").unwrap());

/// Wrapper around an HTTP response.
#[derive(Debug)]
pub struct Response {
    inner: reqwest::Response,
}

impl Response {
    pub(crate) fn new(inner: reqwest::Response) -> Self {
        Self { inner }
    }

    /// Get the HTTP status code.
    pub fn status(&self) -> u16 {
        self.inner.status().as_u16()
    }

    /// Returns true if the response status is successful (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status())
    }

    /// Get a header value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.headers().get(name)?.to_str().ok()
    }

    /// Get the Content-Type header.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Get the response body as bytes.
    pub async fn bytes(self) -> Result<bytes::Bytes> {
        self.inner.bytes().await.map_err(Into::into)
    }

    /// Get the response body as UTF-8 text.
    ///
    /// The body is always decoded as UTF-8 regardless of the charset the
    /// server advertises; invalid sequences are an error.
    pub async fn text(self) -> Result<String> {
        let bytes = self.bytes().await?;
        String::from_utf8(bytes.to_vec()).map_err(|e| {
            Error::with_source(
                ErrorKind::Encoding("response body is not valid UTF-8".to_string()),
                e,
            )
        })
    }

    /// Deserialize the response body as JSON.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T> {
        let bytes = self.bytes().await?;
        serde_json::from_slice(&bytes).map_err(Into::into)
    }

    /// Turn a non-success response into [`ErrorKind::Http`] carrying the
    /// status and the (sanitized) body.
    pub async fn error_for_status(self) -> Result<Response> {
        if self.is_success() {
            return Ok(self);
        }

        let status = self.status();
        match self.inner.bytes().await {
            Ok(bytes) => Err(Error::new(ErrorKind::Http {
                status,
                body: sanitize_error_message(&String::from_utf8_lossy(&bytes)),
            })),
            Err(err) => {
                // Status is still the primary error; the broken body is its source.
                debug!(status, error = %err, "Failed to read error response body");
                Err(Error::with_source(
                    ErrorKind::Http {
                        status,
                        body: String::new(),
                    },
                    err,
                ))
            }
        }
    }
}

/// Sanitize an error body to prevent exposing sensitive data.
///
/// This function:
/// - Removes potential tokens (anything that looks like an access token)
/// - Removes potential session IDs
/// - Truncates messages longer than 500 characters
pub(crate) fn sanitize_error_message(message: &str) -> String {
    const MAX_LENGTH: usize = 500;

    let mut sanitized = TOKEN_PATTERN
        .replace_all(message, "[REDACTED_TOKEN]")
        .to_string();
    sanitized = SESSION_PATTERN
        .replace_all(&sanitized, "sid=[REDACTED]")
        .to_string();

    if sanitized.len() > MAX_LENGTH {
        let mut cut = MAX_LENGTH;
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        sanitized.truncate(cut);
        sanitized.push_str("...[truncated]");
    }

    sanitized
}
