//! Shared, copy-on-write header sets.
//!
//! The headers of a [`TransportContext`](crate::TransportContext) are shared by
//! every request (and every job handle) built from it. They are never mutated
//! in place: an override such as `Content-Type: text/csv` for a batch upload
//! produces a new [`HeaderSet`] and leaves the shared one untouched.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::error::Result;

/// Header name used by Salesforce to request indented JSON.
const X_PRETTY_PRINT: &str = "x-prettyprint";

/// Immutable set of HTTP headers, cheap to clone.
#[derive(Clone, Default)]
pub struct HeaderSet {
    inner: Arc<HeaderMap>,
}

impl std::fmt::Debug for HeaderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in self.inner.iter() {
            if name == AUTHORIZATION {
                map.entry(&name.as_str(), &"[REDACTED]");
            } else {
                map.entry(&name.as_str(), &value.to_str().unwrap_or("<binary>"));
            }
        }
        map.finish()
    }
}

impl HeaderSet {
    /// Wrap an existing header map.
    pub fn new(headers: HeaderMap) -> Self {
        Self {
            inner: Arc::new(headers),
        }
    }

    /// The default header set for an authenticated Bulk API session:
    /// bearer authorization, JSON content type and pretty-printed responses.
    pub fn bearer(session_id: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", session_id))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static(X_PRETTY_PRINT),
            HeaderValue::from_static("1"),
        );
        Ok(Self::new(headers))
    }

    /// Return a copy of this set with `name` set to `value`.
    ///
    /// `self` is left unchanged; requests already holding it keep seeing the
    /// original value.
    pub fn with_override(&self, name: HeaderName, value: HeaderValue) -> Self {
        let mut headers = (*self.inner).clone();
        headers.insert(name, value);
        Self::new(headers)
    }

    /// Return a copy of this set with a header given as strings.
    pub fn with_header(&self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        let value = HeaderValue::from_str(value)?;
        Ok(self.with_override(name, value))
    }

    /// Look up a header value as a string.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner.get(name)?.to_str().ok()
    }

    /// The `Content-Type` header, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.get(CONTENT_TYPE.as_str())
    }

    /// Number of headers in the set.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if the set holds no headers.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Borrow the underlying header map.
    pub fn as_map(&self) -> &HeaderMap {
        &self.inner
    }

    /// Returns true if both sets share the same allocation.
    pub fn ptr_eq(&self, other: &HeaderSet) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl From<HeaderMap> for HeaderSet {
    fn from(headers: HeaderMap) -> Self {
        Self::new(headers)
    }
}
