//! In-memory TTL cache for idempotent GET responses.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::net::executor::ResponseBody;
use crate::observability::metrics;

/// Default time-to-live for cached responses.
pub const DEFAULT_TTL: Duration = Duration::from_millis(60_000);

/// A cached decoded response.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub body: ResponseBody,
    pub status: u16,
}

struct CacheEntry {
    payload: CachedResponse,
    expires_at: Instant,
}

/// TTL cache keyed by `METHOD:full-URL` (query string included).
///
/// Only the executor writes here, and only for successful GETs where the
/// caller opted in. Entries are evicted lazily the moment a read finds
/// them expired; the map itself is unbounded, acceptable for the small
/// endpoint set this client talks to.
pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Fetch a fresh entry, dropping it if it has expired.
    pub fn get(&self, key: &str) -> Option<CachedResponse> {
        let expired = match self.entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                metrics::record_cache_hit();
                return Some(entry.payload.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        metrics::record_cache_miss();
        None
    }

    /// Store or overwrite an entry for `ttl`.
    pub fn set(&self, key: String, payload: CachedResponse, ttl: Duration) {
        self.entries.insert(
            key,
            CacheEntry {
                payload,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(text: &str) -> CachedResponse {
        CachedResponse {
            body: ResponseBody::Text(text.to_string()),
            status: 200,
        }
    }

    #[test]
    fn test_roundtrip_and_overwrite() {
        let cache = ResponseCache::new();
        assert!(cache.get("GET:/track?orderid=1").is_none());

        cache.set("GET:/track?orderid=1".into(), payload("a"), DEFAULT_TTL);
        cache.set("GET:/track?orderid=1".into(), payload("b"), DEFAULT_TTL);

        let hit = cache.get("GET:/track?orderid=1").unwrap();
        assert_eq!(hit.body, ResponseBody::Text("b".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_expired_entry_is_evicted_on_read() {
        let cache = ResponseCache::new();
        cache.set("GET:/x".into(), payload("stale"), Duration::from_millis(20));

        std::thread::sleep(Duration::from_millis(40));

        assert!(cache.get("GET:/x").is_none());
        assert!(cache.is_empty());
    }
}
