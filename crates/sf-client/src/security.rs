//! Security utilities for values that end up in URLs or XML.
//!
//! Job ids come back from the server and object names come from callers;
//! neither is trusted when building a request.
//!
//! ```rust
//! use sfjobs_client::security::{names, url};
//!
//! assert!(names::is_safe_api_name("Account"));
//! let path = format!("ingest/{}", url::encode_param("750xx/../query"));
//! assert_eq!(path, "ingest/750xx%2F..%2Fquery");
//! ```

/// API name validation for sObjects and fields.
pub mod names {
    /// Validate a Salesforce API name (sObject or field).
    ///
    /// API names start with a letter and contain only ASCII letters, digits
    /// and underscores (`Account`, `External_Id__c`, `ns__Widget__c`).
    ///
    /// # Example
    ///
    /// ```rust
    /// use sfjobs_client::security::names;
    ///
    /// assert!(names::is_safe_api_name("Account"));
    /// assert!(names::is_safe_api_name("Custom_Field__c"));
    /// assert!(!names::is_safe_api_name("Bad'; DROP TABLE--"));
    /// ```
    #[must_use]
    pub fn is_safe_api_name(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() => {}
            _ => return false,
        }
        chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
    }
}

/// URL encoding utilities for parameter safety.
pub mod url {
    /// URL-encode a path segment.
    ///
    /// This ensures that a value cannot break out of its URL path segment
    /// or inject query parameters.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sfjobs_client::security::url;
    ///
    /// let encoded = url::encode_param("001/../../secret");
    /// assert_eq!(encoded, "001%2F..%2F..%2Fsecret");
    /// ```
    #[must_use]
    pub fn encode_param(value: &str) -> String {
        urlencoding::encode(value).into_owned()
    }
}

/// XML escaping utilities for SOAP requests.
pub mod xml {
    /// Escape a string for safe inclusion in XML content.
    ///
    /// This escapes the five predefined XML entities.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sfjobs_client::security::xml;
    ///
    /// let safe = xml::escape("Hello <World> & 'Friends'");
    /// assert_eq!(safe, "Hello &lt;World&gt; &amp; &apos;Friends&apos;");
    /// ```
    #[must_use]
    pub fn escape(value: &str) -> String {
        let mut escaped = String::with_capacity(value.len() + 16);
        for ch in value.chars() {
            match ch {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '"' => escaped.push_str("&quot;"),
                '\'' => escaped.push_str("&apos;"),
                _ => escaped.push(ch),
            }
        }
        escaped
    }
}
