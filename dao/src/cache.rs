//! Parsed-payload cache keyed by the hash of the assembled URL.
//!
//! The store is a constructor-passed collaborator so the request path stays
//! independent of the eviction policy. The default implementation is a
//! bounded `moka` cache with an explicit TTL; the backing store owns
//! invalidation beyond that.

use crate::formats::Payload;
use crate::metrics_defs::{PAYLOAD_CACHE_HIT, PAYLOAD_CACHE_MISS};
use moka::sync::Cache;
use shared::counter;
use std::time::Duration;

const DEFAULT_CAPACITY: u64 = 1000;
const DEFAULT_TTL_SECS: u64 = 60;

pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Payload>;
    fn insert(&self, key: &str, payload: Payload);
}

pub struct MokaCache {
    cache: Cache<String, Payload>,
}

impl MokaCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();

        MokaCache { cache }
    }
}

impl Default for MokaCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, Duration::from_secs(DEFAULT_TTL_SECS))
    }
}

impl CacheStore for MokaCache {
    fn get(&self, key: &str) -> Option<Payload> {
        let payload = self.cache.get(key);
        if payload.is_some() {
            counter!(PAYLOAD_CACHE_HIT).increment(1);
        } else {
            counter!(PAYLOAD_CACHE_MISS).increment(1);
        }
        payload
    }

    fn insert(&self, key: &str, payload: Payload) {
        self.cache.insert(key.to_string(), payload);
    }
}
