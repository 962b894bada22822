//! HTTP client module
//!
//! Provides the resource client used by every fetch strategy.
//!
//! # Features
//!
//! - **Single round trip**: one GET per call, non-2xx responses become errors
//! - **Transport seam**: the [`Transport`] trait lets callers inject fakes
//! - **Response caching**: optional in-memory LRU cache in front of a transport
//! - **Rate Limiting**: optional token bucket throttle using governor

mod cache;
mod client;
mod rate_limit;
mod transport;

pub use cache::{CachedTransport, MemoryCache, ResponseCache, DEFAULT_CACHE_CAPACITY};
pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use transport::{ApiResponse, RequestConfig, Transport};
