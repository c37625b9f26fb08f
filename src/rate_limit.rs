//! Per-client submission rate limiting.
//!
//! Tracks a bounded map of submission counts keyed by an advisory client key
//! (usually a source address). Entries expire a fixed TTL after their last
//! write and the least-recently-touched entry is evicted once the map exceeds
//! capacity. The limiter is an abuse deterrent, not an access control:
//! keys are spoofable and same-key races may under-count by one.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

pub const DEFAULT_SUBMISSION_LIMIT: u32 = 3;
pub const DEFAULT_MAX_CLIENTS: usize = 500;
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60 * 24);

/// Time source for the limiter, injectable so tests can simulate the clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Production clock backed by `Instant::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    count: u32,
    /// TTL is measured from the last write, not the last read.
    last_write: Instant,
    /// Recency for LRU eviction; reads refresh this.
    last_touch: Instant,
}

pub struct RateLimiter {
    limit: u32,
    capacity: usize,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, Entry>>,
}

impl RateLimiter {
    pub fn new(limit: u32, capacity: usize, ttl: Duration) -> Self {
        Self::with_clock(limit, capacity, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(limit: u32, capacity: usize, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        assert!(limit > 0, "Submission limit must be positive");
        assert!(capacity > 0, "Client capacity must be positive");
        assert!(capacity <= 1_000_000, "Client capacity exceeds bounds");
        assert!(ttl > Duration::ZERO, "Entry TTL must be positive");
        Self {
            limit,
            capacity,
            ttl,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// True iff the effective count for `key` has reached the limit.
    /// An entry older than the TTL never counts and is dropped on sight.
    pub fn has_exceeded_limit(&self, key: &str) -> bool {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match entries.get_mut(key) {
            Some(entry) if now.duration_since(entry.last_write) > self.ttl => {}
            Some(entry) => {
                entry.last_touch = now;
                return entry.count >= self.limit;
            }
            None => return false,
        }
        // Entry outlived its TTL; drop it so it never counts again.
        entries.remove(key);
        false
    }

    /// Record one accepted submission for `key` and return the new count.
    /// An absent or expired entry counts as zero before the increment.
    pub fn increment_count(&self, key: &str) -> u32 {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let current = match entries.get(key) {
            Some(entry) if now.duration_since(entry.last_write) <= self.ttl => entry.count,
            _ => 0,
        };
        let new_count = current.saturating_add(1);
        entries.insert(
            key.to_string(),
            Entry {
                count: new_count,
                last_write: now,
                last_touch: now,
            },
        );
        if entries.len() > self.capacity {
            evict_least_recently_touched(&mut entries, key);
        }
        assert!(new_count >= 1, "Incremented count must be positive");
        new_count
    }
}

fn evict_least_recently_touched(entries: &mut HashMap<String, Entry>, just_written: &str) {
    let victim = entries
        .iter()
        .filter(|(key, _)| key.as_str() != just_written)
        .min_by_key(|(_, entry)| entry.last_touch)
        .map(|(key, _)| key.clone());
    if let Some(victim) = victim {
        entries.remove(&victim);
    }
}
