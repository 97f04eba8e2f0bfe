//! Process-wide TTL cache for extraction results.
//!
//! `get` is a pure lookup: entries are never evicted, only overwritten by
//! a later `put` for the same key. Freshness is the caller's decision,
//! made by comparing the entry's age against the cache's TTL window via
//! [`CacheEntry::is_fresh`] (or the [`TtlCache::get_fresh`] shorthand).
//!
//! Two concurrent requests that both miss the same key will both extract
//! and both `put`; the last write wins. There is no in-flight coalescing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeDelta, Utc};

/// Injected time source, so TTL behavior is testable without sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock [`Clock`] used in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A stored record plus the instant it was stored.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub data: T,
    pub stored_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    /// Whether this entry is still inside the TTL window at `now`.
    ///
    /// The boundary is exclusive: an entry whose age equals the window is
    /// already stale.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
        now.signed_duration_since(self.stored_at) < ttl
    }
}

/// Keyed store of the most recent record per lookup key.
pub struct TtlCache<T> {
    entries: Mutex<HashMap<String, CacheEntry<T>>>,
    clock: Arc<dyn Clock>,
    ttl: TimeDelta,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl_secs: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
            ttl: TimeDelta::seconds(i64::try_from(ttl_secs).unwrap_or(i64::MAX)),
        }
    }

    /// Raw lookup. Returns the stored entry regardless of age; never evicts.
    pub fn get(&self, key: &str) -> Option<CacheEntry<T>> {
        self.entries
            .lock()
            .expect("cache lock poisoned")
            .get(key)
            .cloned()
    }

    /// Lookup that applies the freshness test for the caller. Stale entries
    /// are reported as a miss but remain in storage.
    pub fn get_fresh(&self, key: &str) -> Option<T> {
        let entry = self.get(key)?;
        entry
            .is_fresh(self.clock.now(), self.ttl)
            .then_some(entry.data)
    }

    /// Stores `data` under `key`, replacing any previous entry whole.
    pub fn put(&self, key: impl Into<String>, data: T) {
        let entry = CacheEntry {
            data,
            stored_at: self.clock.now(),
        };
        self.entries
            .lock()
            .expect("cache lock poisoned")
            .insert(key.into(), entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Manually advanced clock for deterministic TTL tests.
    struct TestClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl TestClock {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                now: Mutex::new(Utc::now()),
            })
        }

        fn advance_secs(&self, secs: i64) {
            let mut now = self.now.lock().unwrap();
            *now += TimeDelta::seconds(secs);
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }

    #[test]
    fn put_then_get_within_window_is_fresh() {
        let clock = TestClock::new();
        let cache: TtlCache<String> = TtlCache::new(90, clock.clone());
        cache.put("https://www.sierra.com/p/x", "record".to_string());

        clock.advance_secs(89);
        assert_eq!(
            cache.get_fresh("https://www.sierra.com/p/x").as_deref(),
            Some("record")
        );
    }

    #[test]
    fn expired_entry_is_a_miss_but_stays_in_storage() {
        let clock = TestClock::new();
        let cache: TtlCache<String> = TtlCache::new(90, clock.clone());
        cache.put("key", "record".to_string());

        clock.advance_secs(90);
        assert!(cache.get_fresh("key").is_none(), "age == TTL is stale");
        assert!(cache.get("key").is_some(), "raw lookup still sees the entry");
    }

    #[test]
    fn put_overwrites_whole_entry() {
        let clock = TestClock::new();
        let cache: TtlCache<String> = TtlCache::new(120, clock.clone());
        cache.put("key", "first".to_string());
        clock.advance_secs(200);
        cache.put("key", "second".to_string());

        assert_eq!(cache.get_fresh("key").as_deref(), Some("second"));
    }

    #[test]
    fn unknown_key_is_a_miss() {
        let cache: TtlCache<String> = TtlCache::new(90, TestClock::new());
        assert!(cache.get("nothing").is_none());
    }
}
