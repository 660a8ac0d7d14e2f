//! PubMed literature lookup over NCBI E-utilities (esearch → esummary),
//! with an optional bounded cache keyed by exact query and result cap.

pub mod client;
pub mod types;

pub use client::{LiteratureSource, PubMedClient, PubMedError};
pub use types::Citation;

use std::sync::Mutex;

use tracing::{debug, warn};

use crate::cache::LruCache;

type CacheKey = (String, usize);

/// Citation lookup that never fails: any error from the underlying source
/// is logged and yields an empty list. Only successful results are cached.
pub struct LiteratureLookup<S> {
    source: S,
    cache: Option<Mutex<LruCache<CacheKey, Vec<Citation>>>>,
}

impl<S: LiteratureSource> LiteratureLookup<S> {
    /// `cache_capacity == 0` disables caching.
    pub fn new(source: S, cache_capacity: usize) -> Self {
        let cache = (cache_capacity > 0).then(|| Mutex::new(LruCache::new(cache_capacity)));
        Self { source, cache }
    }

    pub async fn lookup(&self, query: &str, max_results: usize) -> Vec<Citation> {
        if max_results == 0 {
            return Vec::new();
        }

        let key = (query.to_string(), max_results);
        if let Some(hit) = self.cached(&key) {
            debug!(query, count = hit.len(), "citation cache hit");
            return hit;
        }

        match self.source.search(query, max_results).await {
            Ok(mut citations) => {
                citations.truncate(max_results);
                self.store(key, &citations);
                citations
            }
            Err(e) => {
                warn!(query, error = %e, "citation lookup failed; continuing without citations");
                Vec::new()
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn source(&self) -> &S {
        &self.source
    }

    fn cached(&self, key: &CacheKey) -> Option<Vec<Citation>> {
        let cache = self.cache.as_ref()?;
        let mut guard = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.get(key)
    }

    fn store(&self, key: CacheKey, citations: &[Citation]) {
        if let Some(cache) = &self.cache {
            let mut guard = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            guard.insert(key, citations.to_vec());
            debug!(entries = guard.len(), "citations cached");
        }
    }
}
