//! Transport abstraction
//!
//! Everything above the HTTP layer talks to a [`Transport`], never to reqwest
//! directly, so the pagination and batching code can run against fakes.

use crate::error::Result;
use crate::types::{JsonValue, StringMap};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

/// Configuration for a single request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestConfig {
    /// Query parameters
    pub query: StringMap,
    /// Request headers
    pub headers: StringMap,
}

impl RequestConfig {
    /// Create a new request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a request config from a parameter map
    pub fn from_params(params: &StringMap) -> Self {
        Self {
            query: params.clone(),
            headers: StringMap::new(),
        }
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Stable key identifying this request against `url`
    pub fn cache_key(&self, url: &str) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish();
        let mut key = format!("GET {url}?{query}");
        for (name, value) in &self.headers {
            key.push('\n');
            key.push_str(&name.to_ascii_lowercase());
            key.push(':');
            key.push_str(value);
        }
        key
    }
}

/// A successful, decoded API response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw response headers
    pub headers: HeaderMap,
    /// Decoded JSON body (`null` for an empty body)
    pub body: JsonValue,
}

impl ApiResponse {
    /// Create a response with no headers
    pub fn new(status: u16, body: JsonValue) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body,
        }
    }

    /// Create a 200 response
    pub fn ok(body: JsonValue) -> Self {
        Self::new(200, body)
    }

    /// Add a header. Invalid names or values are ignored.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    /// Look up a header value as text (case-insensitive name)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Performs one authenticated GET and decodes the body
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch `url` (absolute, or relative to the transport's base URL)
    async fn get(&self, url: &str, request: &RequestConfig) -> Result<ApiResponse>;

    /// The absolute URL `url` would be fetched from
    fn resolve_url(&self, url: &str) -> String {
        url.to_string()
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for &T {
    async fn get(&self, url: &str, request: &RequestConfig) -> Result<ApiResponse> {
        (**self).get(url, request).await
    }

    fn resolve_url(&self, url: &str) -> String {
        (**self).resolve_url(url)
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn get(&self, url: &str, request: &RequestConfig) -> Result<ApiResponse> {
        (**self).get(url, request).await
    }

    fn resolve_url(&self, url: &str) -> String {
        (**self).resolve_url(url)
    }
}
