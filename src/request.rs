//! Request and response types that dispatch reads from and writes to.
//!
//! The router only needs the small contract in [`RoutableRequest`]; callers
//! with their own request type implement it. [`Request`] and [`Response`] are
//! ready-made implementations.

use http::{HeaderMap, Method};
use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;

use crate::router::Params;

/// What the router needs from an inbound request.
pub trait RoutableRequest {
    /// The request method token, e.g. `GET`
    fn method(&self) -> &str;

    /// Path plus optional query, or an absolute URL
    fn url(&self) -> &str;

    /// The URL before any upstream rewriting; used for the normalized URL
    fn original_url(&self) -> Option<&str> {
        None
    }

    /// Replace the parameters bound to this request.
    fn set_params(&mut self, params: Params);

    fn set_normalized_url(&mut self, _normalized: String) {}
}

/// Extract the path component of a request URL. Query and fragment are
/// dropped; an absolute URL loses its scheme and authority.
///
/// The path is returned as sent: `.`/`..` segments are not resolved and
/// percent-escapes are not touched, whether or not the URL is absolute.
#[must_use]
pub fn path_of(raw: &str) -> Cow<'_, str> {
    let rest = match raw.find("://") {
        Some(scheme_end) if !raw[..scheme_end].contains(['/', '?', '#']) => {
            let authority = &raw[scheme_end + 3..];
            let path_start = authority.find(['/', '?', '#']).unwrap_or(authority.len());
            &authority[path_start..]
        }
        _ => raw,
    };
    let end = rest.find(['?', '#']).unwrap_or(rest.len());
    let path = &rest[..end];
    if path.is_empty() {
        Cow::Borrowed("/")
    } else {
        Cow::Borrowed(path)
    }
}

/// Parse query string parameters from a URL.
///
/// Everything after the first `?` is form-decoded; a repeated name keeps its
/// last value.
#[must_use]
pub fn parse_query_params(raw: &str) -> HashMap<String, String> {
    let Some(pos) = raw.find('?') else {
        return HashMap::new();
    };
    let query = &raw[pos + 1..];
    let query = query.split('#').next().unwrap_or_default();
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// An inbound request.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Path plus optional query
    pub url: String,
    pub original_url: Option<String>,
    pub headers: HeaderMap,
    /// Written by dispatch
    pub params: Params,
    /// Written by dispatch
    pub normalized_url: Option<String>,
}

impl Request {
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Request {
            method,
            url: url.into(),
            original_url: None,
            headers: HeaderMap::new(),
            params: Params::default(),
            normalized_url: None,
        }
    }

    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    #[must_use]
    pub fn with_original_url(mut self, original: impl Into<String>) -> Self {
        self.original_url = Some(original.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    #[must_use]
    pub fn path(&self) -> Cow<'_, str> {
        path_of(&self.url)
    }

    #[must_use]
    pub fn query_params(&self) -> HashMap<String, String> {
        parse_query_params(&self.url)
    }

    /// Get a header by name (case-insensitive)
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl RoutableRequest for Request {
    fn method(&self) -> &str {
        self.method.as_str()
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn original_url(&self) -> Option<&str> {
        self.original_url.as_deref()
    }

    fn set_params(&mut self, params: Params) {
        self.params = params;
    }

    fn set_normalized_url(&mut self, normalized: String) {
        self.normalized_url = Some(normalized);
    }
}

/// Response written by handlers.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub status: u16,
    #[serde(skip_serializing)]
    pub headers: HashMap<String, String>,
    pub body: Value,
}

impl Default for Response {
    fn default() -> Self {
        Response {
            status: 200,
            headers: HashMap::new(),
            body: Value::Null,
        }
    }
}

impl Response {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn json(&mut self, status: u16, body: Value) {
        self.status = status;
        self.headers
            .insert("content-type".to_string(), "application/json".to_string());
        self.body = body;
    }

    pub fn text(&mut self, status: u16, body: impl Into<String>) {
        self.status = status;
        self.headers
            .insert("content-type".to_string(), "text/plain".to_string());
        self.body = Value::String(body.into());
    }

    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into().to_ascii_lowercase(), value.into());
    }
}
