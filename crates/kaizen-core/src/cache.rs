use std::collections::HashMap;
use std::time::{Duration, Instant};

pub const DEFAULT_TTL: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// TtlCache
// ---------------------------------------------------------------------------

/// Small TTL cache for derived, re-computable results. Never holds
/// authoritative state: mutation paths invalidate the entries they would
/// make stale, and a lost entry only costs a re-read. Constructed
/// explicitly and owned by its caller, so tests get a fresh one each run.
#[derive(Debug, Default)]
pub struct TtlCache {
    entries: HashMap<String, Entry>,
}

#[derive(Debug)]
struct Entry {
    value: serde_json::Value,
    expires_at: Instant,
}

impl TtlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a live entry. Expired entries are dropped on access.
    pub fn get(&mut self, key: &str) -> Option<serde_json::Value> {
        match self.entries.get(key) {
            Some(entry) if Instant::now() <= entry.expires_at => Some(entry.value.clone()),
            Some(_) => {
                self.entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn put(&mut self, key: &str, value: serde_json::Value) {
        self.put_with_ttl(key, value, DEFAULT_TTL);
    }

    pub fn put_with_ttl(&mut self, key: &str, value: serde_json::Value, ttl: Duration) {
        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    pub fn invalidate(&mut self, key: &str) {
        self.entries.remove(key);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_returns_live_entries() {
        let mut cache = TtlCache::new();
        cache.put("status:auth", serde_json::json!({"phase": "plan"}));
        assert_eq!(cache.get("status:auth").unwrap()["phase"], "plan");
        assert!(cache.get("missing").is_none());
    }

    #[test]
    fn expired_entries_are_dropped_on_access() {
        let mut cache = TtlCache::new();
        cache.put_with_ttl("k", serde_json::json!(1), Duration::ZERO);
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get("k").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn invalidate_removes_entry() {
        let mut cache = TtlCache::new();
        cache.put("a", serde_json::json!(1));
        cache.put("b", serde_json::json!(2));
        cache.invalidate("a");
        assert!(cache.get("a").is_none());
        assert_eq!(cache.get("b").unwrap(), 2);
    }

    #[test]
    fn clear_empties_the_cache() {
        let mut cache = TtlCache::new();
        cache.put("a", serde_json::json!(1));
        cache.clear();
        assert_eq!(cache.len(), 0);
    }
}
