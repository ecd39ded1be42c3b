//! HTTP request building on top of a shared [`HeaderSet`].

use bytes::Bytes;
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::Serialize;

use crate::error::Result;
use crate::headers::HeaderSet;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
    Patch,
    Put,
}

impl RequestMethod {
    /// Convert to reqwest::Method.
    pub fn to_reqwest(&self) -> reqwest::Method {
        match self {
            RequestMethod::Get => reqwest::Method::GET,
            RequestMethod::Post => reqwest::Method::POST,
            RequestMethod::Patch => reqwest::Method::PATCH,
            RequestMethod::Put => reqwest::Method::PUT,
        }
    }
}

/// Builder for a single HTTP request.
///
/// Header changes made through the builder never touch the [`HeaderSet`] it was
/// created from; each one yields a private copy for this request only.
#[derive(Debug)]
pub struct RequestBuilder {
    pub(crate) method: RequestMethod,
    pub(crate) url: String,
    pub(crate) headers: HeaderSet,
    pub(crate) body: Option<RequestBody>,
}

/// Request body content.
#[derive(Debug)]
pub enum RequestBody {
    Json(serde_json::Value),
    Bytes(Bytes),
}

impl RequestBuilder {
    /// Create a new request builder seeded with `headers`.
    pub fn new(method: RequestMethod, url: impl Into<String>, headers: HeaderSet) -> Self {
        Self {
            method,
            url: url.into(),
            headers,
            body: None,
        }
    }

    /// Request method.
    pub fn method(&self) -> RequestMethod {
        self.method
    }

    /// Target URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Headers this request will be sent with.
    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    /// Add or replace a header on this request only.
    pub fn header(mut self, name: &str, value: &str) -> Result<Self> {
        self.headers = self.headers.with_header(name, value)?;
        Ok(self)
    }

    /// Set JSON body.
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        let value = serde_json::to_value(body)?;
        self.body = Some(RequestBody::Json(value));
        self.headers = self
            .headers
            .with_override(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(self)
    }

    /// Set CSV body (for Bulk API batch uploads).
    ///
    /// The text is sent as UTF-8 bytes with `Content-Type: text/csv`.
    pub fn csv(mut self, data: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Bytes(Bytes::from(data.into())));
        self.headers = self
            .headers
            .with_override(CONTENT_TYPE, HeaderValue::from_static("text/csv"));
        self
    }

    /// Set an XML body (SOAP envelopes).
    pub fn xml(mut self, envelope: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Bytes(Bytes::from(envelope.into())));
        self.headers = self.headers.with_override(
            CONTENT_TYPE,
            HeaderValue::from_static("text/xml; charset=UTF-8"),
        );
        self
    }

    /// Ask for a CSV response body.
    pub fn accept_csv(mut self) -> Self {
        self.headers = self
            .headers
            .with_override(ACCEPT, HeaderValue::from_static("text/csv"));
        self
    }
}
