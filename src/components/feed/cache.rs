use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct CachedFeed {
    text: String,
    fetched_at: DateTime<Utc>,
}

/// Raw feed text keyed by feed id, reused for a fixed time
#[derive(Debug, Clone)]
pub struct FeedCache {
    ttl: Duration,
    entries: HashMap<String, CachedFeed>,
}

impl FeedCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Cached text for `key` if it was fetched less than `ttl` before `now`
    pub fn get(&self, key: &str, now: DateTime<Utc>) -> Option<&str> {
        self.entries
            .get(key)
            .filter(|cached| now - cached.fetched_at < self.ttl)
            .map(|cached| cached.text.as_str())
    }

    pub fn insert(&mut self, key: impl Into<String>, text: String, now: DateTime<Utc>) {
        self.entries.insert(
            key.into(),
            CachedFeed {
                text,
                fetched_at: now,
            },
        );
    }

    /// Forget everything
    pub fn invalidate_all(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
