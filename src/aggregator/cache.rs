use std::time::{Duration, Instant};

use dashmap::DashMap;

use super::types::Asset;

#[derive(Debug, Clone, Copy)]
struct CachedPrice {
    price: f64,
    expires_at: Instant,
}

impl CachedPrice {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Last confirmed price per (provider, asset), kept for a fixed TTL.
/// Failures are never stored; expired entries are dropped on the read path.
/// Reads and writes for different keys land on different map shards, so
/// unrelated providers never contend on one lock.
#[derive(Debug)]
pub struct QuoteCache {
    entries: DashMap<(&'static str, Asset), CachedPrice>,
    ttl: Duration,
}

impl QuoteCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn get(&self, provider: &'static str, asset: Asset) -> Option<f64> {
        let key = (provider, asset);
        let expired = match self.entries.get(&key) {
            Some(entry) if !entry.is_expired() => return Some(entry.price),
            Some(_) => true,
            None => false,
        };

        if expired {
            // Expiry is re-checked under the shard lock; a concurrent fresh
            // insert for the same key survives.
            self.entries.remove_if(&key, |_, entry| entry.is_expired());
        }
        None
    }

    pub fn insert(&self, provider: &'static str, asset: Asset, price: f64) {
        self.entries.insert(
            (provider, asset),
            CachedPrice {
                price,
                expires_at: Instant::now() + self.ttl,
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
