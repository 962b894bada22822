//! Response caching
//!
//! A [`CachedTransport`] answers repeated identical requests from a
//! [`ResponseCache`] instead of the network. Only successful responses are
//! stored. Entries live for the lifetime of the process.

use super::transport::{ApiResponse, RequestConfig, Transport};
use crate::error::Result;
use async_trait::async_trait;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Default number of responses kept in memory
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Storage for decoded responses keyed by request identity
pub trait ResponseCache: Send + Sync {
    /// Look up a stored response
    fn get(&self, key: &str) -> Option<ApiResponse>;

    /// Store a response
    fn put(&self, key: String, response: ApiResponse);
}

/// Bounded in-memory LRU cache
pub struct MemoryCache {
    entries: Mutex<LruCache<String, ApiResponse>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryCache {
    /// Create a cache holding at most `capacity` responses (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Number of stored responses
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lookups answered from the cache
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Lookups that fell through to the transport
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl ResponseCache for MemoryCache {
    fn get(&self, key: &str) -> Option<ApiResponse> {
        let found = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned();
        let counter = if found.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    fn put(&self, key: String, response: ApiResponse) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .put(key, response);
    }
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("len", &self.len())
            .field("hits", &self.hits())
            .field("misses", &self.misses())
            .finish()
    }
}

/// Transport wrapper that consults a cache before the network
#[derive(Debug)]
pub struct CachedTransport<T, C = MemoryCache> {
    inner: T,
    cache: C,
}

impl<T: Transport> CachedTransport<T, MemoryCache> {
    /// Wrap a transport with an in-memory cache
    pub fn in_memory(inner: T, capacity: usize) -> Self {
        Self::new(inner, MemoryCache::new(capacity))
    }
}

impl<T: Transport, C: ResponseCache> CachedTransport<T, C> {
    /// Wrap a transport with the given cache
    pub fn new(inner: T, cache: C) -> Self {
        Self { inner, cache }
    }

    /// The wrapped transport
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// The cache
    pub fn cache(&self) -> &C {
        &self.cache
    }
}

#[async_trait]
impl<T: Transport, C: ResponseCache> Transport for CachedTransport<T, C> {
    async fn get(&self, url: &str, request: &RequestConfig) -> Result<ApiResponse> {
        let key = request.cache_key(url);
        if let Some(response) = self.cache.get(&key) {
            debug!(url, "Served from cache");
            return Ok(response);
        }

        let response = self.inner.get(url, request).await?;
        self.cache.put(key, response.clone());
        Ok(response)
    }

    fn resolve_url(&self, url: &str) -> String {
        self.inner.resolve_url(url)
    }
}
