//! Process-wide embedding cache owned by the similarity engine.
//!
//! Insert-if-absent semantics: two requests racing on the same key both compute an
//! embedding, the first insert wins and the second value is dropped.

use std::num::NonZeroUsize;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use lru::LruCache;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Characters of input used by the prefix key policy.
pub const PREFIX_KEY_CHARS: usize = 100;

/// How cache keys are derived from input text.
///
/// `Prefix` keys on the first characters only, so two texts sharing that prefix
/// share one vector. `Sha256` keys on the full content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKeyPolicy {
    Prefix(usize),
    Sha256,
}

impl Default for CacheKeyPolicy {
    fn default() -> Self {
        CacheKeyPolicy::Prefix(PREFIX_KEY_CHARS)
    }
}

impl FromStr for CacheKeyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prefix" => Ok(CacheKeyPolicy::default()),
            "sha256" | "hash" => Ok(CacheKeyPolicy::Sha256),
            other => Err(format!("unknown cache key policy '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CacheConfig {
    pub key_policy: CacheKeyPolicy,
    /// LRU bound; `None` means unbounded.
    pub capacity: Option<NonZeroUsize>,
    /// Entries older than this are treated as misses.
    pub ttl: Option<Duration>,
}

struct CachedVector {
    vector: Arc<Vec<f32>>,
    inserted_at: Instant,
}

pub struct EmbeddingCache {
    key_policy: CacheKeyPolicy,
    ttl: Option<Duration>,
    entries: Mutex<LruCache<String, CachedVector>>,
}

impl EmbeddingCache {
    pub fn new(config: &CacheConfig) -> Self {
        let entries = match config.capacity {
            Some(cap) => LruCache::new(cap),
            None => LruCache::unbounded(),
        };
        Self {
            key_policy: config.key_policy,
            ttl: config.ttl,
            entries: Mutex::new(entries),
        }
    }

    pub fn key_for(&self, text: &str) -> String {
        match self.key_policy {
            CacheKeyPolicy::Prefix(n) => text.chars().take(n).collect(),
            CacheKeyPolicy::Sha256 => format!("{:x}", Sha256::digest(text.as_bytes())),
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<Vec<f32>>> {
        let mut entries = self.lock();
        let expired = match entries.get(key) {
            Some(entry) if !self.is_expired(entry) => {
                debug!("Embedding cache hit");
                return Some(Arc::clone(&entry.vector));
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        None
    }

    /// Stores `vector` unless a live entry already exists; returns the cached value.
    pub fn insert(&self, key: String, vector: Arc<Vec<f32>>) -> Arc<Vec<f32>> {
        let mut entries = self.lock();
        if let Some(existing) = entries.get(&key) {
            if !self.is_expired(existing) {
                return Arc::clone(&existing.vector);
            }
        }
        entries.put(
            key,
            CachedVector {
                vector: Arc::clone(&vector),
                inserted_at: Instant::now(),
            },
        );
        vector
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn is_expired(&self, entry: &CachedVector) -> bool {
        self.ttl
            .map(|ttl| entry.inserted_at.elapsed() >= ttl)
            .unwrap_or(false)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<String, CachedVector>> {
        // poisoning ignored
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
