//! Intercepted request description

use crate::error::{SwError, SwResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::{Origin, Url};

/// HTTP request method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl Method {
    /// Get the wire name of the method
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = SwError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "HEAD" => Ok(Self::Head),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "OPTIONS" => Ok(Self::Options),
            _ => Err(SwError::InvalidMethod(s.to_string())),
        }
    }
}

/// What the requester intends to do with the response
///
/// Drives the offline fallback ladder: documents fall back to the root
/// page, images to a placeholder, everything else to a synthetic response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    Document,
    Image,
    Script,
    Style,
    Font,
    Manifest,
    #[default]
    Empty,
}

impl Destination {
    /// Guess a destination from the URL path, for callers that don't know it
    pub fn infer(url: &Url) -> Self {
        let path = url.path();
        if path.ends_with('/') {
            return Self::Document;
        }
        let ext = path
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "html" | "htm" => Self::Document,
            "png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" | "ico" | "avif" => Self::Image,
            "js" | "mjs" => Self::Script,
            "css" => Self::Style,
            "woff" | "woff2" | "ttf" | "otf" => Self::Font,
            "webmanifest" => Self::Manifest,
            _ => Self::Empty,
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Document => "document",
            Self::Image => "image",
            Self::Script => "script",
            Self::Style => "style",
            Self::Font => "font",
            Self::Manifest => "manifest",
            Self::Empty => "",
        };
        f.write_str(name)
    }
}

impl FromStr for Destination {
    type Err = SwError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "document" => Ok(Self::Document),
            "image" => Ok(Self::Image),
            "script" => Ok(Self::Script),
            "style" => Ok(Self::Style),
            "font" => Ok(Self::Font),
            "manifest" => Ok(Self::Manifest),
            "" | "empty" => Ok(Self::Empty),
            other => Err(SwError::User(format!("Unknown request destination: {}", other))),
        }
    }
}

/// A request as seen by the fetch handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Request method
    pub method: Method,
    /// Absolute request URL
    pub url: Url,
    /// Expected destination of the response
    pub destination: Destination,
    /// Request headers forwarded to the network
    pub headers: Vec<(String, String)>,
}

impl Request {
    /// Create a GET request with an empty destination
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::Get,
            url,
            destination: Destination::Empty,
            headers: Vec::new(),
        }
    }

    /// Parse a request target, resolving relative paths against `base`
    pub fn parse(target: &str, base: &Url) -> SwResult<Self> {
        let url = base
            .join(target)
            .map_err(|e| SwError::invalid_url(target, e))?;
        Ok(Self::get(url))
    }

    /// Set the request method
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set the request destination
    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    /// Add a request header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Key under which this request is stored in a cache
    pub fn cache_key(&self) -> String {
        let mut url = self.url.clone();
        url.set_fragment(None);
        url.into()
    }

    /// Whether the request targets the given origin
    pub fn is_same_origin(&self, origin: &Origin) -> bool {
        self.url.origin() == *origin
    }
}
