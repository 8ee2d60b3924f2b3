//! Responses returned by the fetch handler

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Header set on responses generated locally while offline
pub const OFFLINE_HEADER: &str = "x-swcache-offline";

/// An HTTP response, either from the network, a cache, or generated locally
///
/// The body is reference-counted, so cloning a response (to hand one copy
/// to the caller and store the other) does not copy the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// Reason phrase
    pub status_text: String,
    /// Response headers
    pub headers: Vec<(String, String)>,
    /// Response body
    pub body: Bytes,
}

impl Response {
    /// Create a response with the given status and body
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            status_text: reason_phrase(status).to_string(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Create a 200 response
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(200, body)
    }

    /// Create the synthetic response served when nothing better is available offline
    pub fn offline(status: u16, body: &str) -> Self {
        Self::new(status, body.to_string())
            .with_header("content-type", "text/plain; charset=utf-8")
            .with_header(OFFLINE_HEADER, "1")
    }

    /// Add a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Look up a header value (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether this response was generated locally as an offline marker
    pub fn is_offline_marker(&self) -> bool {
        self.header(OFFLINE_HEADER).is_some()
    }
}

/// Where a response handed back to the caller came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ResponseSource {
    /// Served from the named cache without touching the network
    Cache { name: String },
    /// Fetched from the network
    Network,
    /// Network failed; served a cached fallback for `key`
    Fallback { name: String, key: String },
    /// Network failed and no fallback was cached
    Offline,
}

impl fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cache { name } => write!(f, "cache ({})", name),
            Self::Network => write!(f, "network"),
            Self::Fallback { name, key } => write!(f, "fallback {} ({})", key, name),
            Self::Offline => write!(f, "offline"),
        }
    }
}

/// Canonical reason phrase for the status codes this crate produces or stores
pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        206 => "Partial Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        403 => "Forbidden",
        404 => "Not Found",
        408 => "Request Timeout",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_response_is_marked() {
        let response = Response::offline(503, "Offline");
        assert_eq!(response.status, 503);
        assert_eq!(response.status_text, "Service Unavailable");
        assert!(response.is_offline_marker());
        assert!(!response.is_success());
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let response = Response::ok("x").with_header("Content-Type", "text/html");
        assert_eq!(response.header("content-type"), Some("text/html"));
        assert_eq!(response.header("etag"), None);
    }

    #[test]
    fn clone_shares_body() {
        let response = Response::ok(vec![1u8; 1024]);
        let copy = response.clone();
        assert_eq!(copy.body.as_ptr(), response.body.as_ptr());
    }

    #[test]
    fn source_display() {
        let source = ResponseSource::Cache {
            name: "html-static-v2".to_string(),
        };
        assert_eq!(source.to_string(), "cache (html-static-v2)");
        assert_eq!(ResponseSource::Offline.to_string(), "offline");
    }
}
