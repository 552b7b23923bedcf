//! Short-Term Memory.
//!
//! A bounded, time-decaying queue of the most recent utterances in a
//! conversation.
//!
//! # Eviction
//!
//! After every insertion two passes run, in this order:
//!
//! 1. **Capacity** – while more than `capacity` items are held, drop the
//!    oldest.
//! 2. **Age** – while more than `min_retained` items are held *and* the oldest
//!    item is older than `time_to_live`, drop the oldest.  The pass stops at
//!    the first fresh item, so stale items sitting behind a fresh one survive.
//!
//! The `min_retained` newest items are therefore never evicted for age.
//!
//! # Example
//!
//! ```rust
//! use parlor_memory::short_term::{ShortTermConfig, ShortTermStore};
//! use parlor_types::Role;
//!
//! let mut store = ShortTermStore::new(ShortTermConfig {
//!     capacity: 2,
//!     ..ShortTermConfig::default()
//! });
//! store.add(Role::User, "one");
//! store.add(Role::Assistant, "two");
//! store.add(Role::User, "three");
//!
//! let recent = store.recent(8);
//! assert_eq!(recent.len(), 2);
//! assert_eq!(recent[0].1, "two");
//! ```

use chrono::{DateTime, Duration, Utc};
use parlor_types::Role;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

/// Upper bound on the buffer slots reserved up front by [`ShortTermStore::new`].
const PREALLOC_LIMIT: usize = 64;

// ─────────────────────────────────────────────────────────────────────────────
// MemoryItem
// ─────────────────────────────────────────────────────────────────────────────

/// A single timestamped utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryItem {
    pub role: Role,
    pub text: String,
    /// Wall-clock time at which the utterance was ingested.
    pub timestamp: DateTime<Utc>,
}

// ─────────────────────────────────────────────────────────────────────────────
// ShortTermConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Retention policy for a [`ShortTermStore`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShortTermConfig {
    /// Hard upper bound on retained items, regardless of age.
    pub capacity: usize,
    /// Number of newest items exempt from age-based eviction.
    pub min_retained: usize,
    /// Items older than this are eligible for eviction.
    pub time_to_live: Duration,
}

impl Default for ShortTermConfig {
    fn default() -> Self {
        Self {
            capacity: 20,
            min_retained: 3,
            time_to_live: Duration::hours(36),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ShortTermStore
// ─────────────────────────────────────────────────────────────────────────────

/// Bounded recent-utterance buffer with size- and age-based eviction.
#[derive(Debug, Clone, Default)]
pub struct ShortTermStore {
    config: ShortTermConfig,
    items: VecDeque<MemoryItem>,
}

impl ShortTermStore {
    pub fn new(config: ShortTermConfig) -> Self {
        Self {
            config,
            items: VecDeque::with_capacity(config.capacity.min(PREALLOC_LIMIT) + 1),
        }
    }

    pub fn config(&self) -> &ShortTermConfig {
        &self.config
    }

    /// Append an utterance stamped with the current time, then evict.
    pub fn add(&mut self, role: Role, text: impl Into<String>) {
        self.add_at(role, text, Utc::now());
    }

    /// Append an utterance stamped with `now`, then evict relative to `now`.
    ///
    /// Returns the number of items evicted.
    pub fn add_at(&mut self, role: Role, text: impl Into<String>, now: DateTime<Utc>) -> usize {
        self.items.push_back(MemoryItem {
            role,
            text: text.into(),
            timestamp: now,
        });
        let evicted = self.evict(now);
        if evicted > 0 {
            debug!(evicted, retained = self.items.len(), "short-term eviction");
        }
        evicted
    }

    fn evict(&mut self, now: DateTime<Utc>) -> usize {
        let mut evicted = 0;
        while self.items.len() > self.config.capacity {
            self.items.pop_front();
            evicted += 1;
        }
        while self.items.len() > self.config.min_retained {
            let stale = self
                .items
                .front()
                .is_some_and(|oldest| now - oldest.timestamp > self.config.time_to_live);
            if !stale {
                break;
            }
            self.items.pop_front();
            evicted += 1;
        }
        evicted
    }

    /// The last `k` items as `(role, text)` pairs, oldest first.
    pub fn recent(&self, k: usize) -> Vec<(Role, String)> {
        let skip = self.items.len().saturating_sub(k);
        self.items
            .iter()
            .skip(skip)
            .map(|m| (m.role, m.text.clone()))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MemoryItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn store(capacity: usize, min_retained: usize, ttl_secs: i64) -> ShortTermStore {
        ShortTermStore::new(ShortTermConfig {
            capacity,
            min_retained,
            time_to_live: Duration::seconds(ttl_secs),
        })
    }

    fn texts(store: &ShortTermStore) -> Vec<String> {
        store.iter().map(|m| m.text.clone()).collect()
    }

    // ── capacity ─────────────────────────────────────────────────────────────

    #[test]
    fn capacity_evicts_oldest_first() {
        let mut s = store(20, 3, 3600);
        let now = Utc::now();
        for i in 0..25 {
            s.add_at(Role::User, format!("msg {i}"), now);
        }
        assert_eq!(s.len(), 20);
        assert_eq!(s.iter().next().unwrap().text, "msg 5");
        assert_eq!(s.iter().last().unwrap().text, "msg 24");
    }

    #[test]
    fn huge_capacity_does_not_preallocate() {
        let mut s = ShortTermStore::new(ShortTermConfig {
            capacity: usize::MAX,
            ..ShortTermConfig::default()
        });
        s.add(Role::User, "hi");
        for i in 0..100 {
            s.add_at(Role::Assistant, format!("msg {i}"), Utc::now());
        }
        assert_eq!(s.len(), 101);
        assert_eq!(s.iter().next().unwrap().text, "hi");
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut s = store(4, 1, 10);
        let start = Utc::now();
        for i in 0..50 {
            s.add_at(Role::User, "x", start + Duration::seconds(i % 7));
            assert!(s.len() <= 4);
        }
    }

    // ── age ──────────────────────────────────────────────────────────────────

    #[test]
    fn below_floor_nothing_evicted_regardless_of_age() {
        let mut s = store(20, 3, 10);
        let start = Utc::now();
        s.add_at(Role::User, "a", start);
        s.add_at(Role::User, "b", start);
        s.add_at(Role::User, "c", start + Duration::days(30));
        assert_eq!(texts(&s), vec!["a", "b", "c"]);
    }

    #[test]
    fn stale_items_evicted_down_to_floor() {
        let mut s = store(20, 3, 10);
        let start = Utc::now();
        for i in 0..6 {
            s.add_at(Role::User, format!("old {i}"), start);
        }
        let evicted = s.add_at(Role::User, "fresh", start + Duration::seconds(11));
        assert_eq!(evicted, 4);
        assert_eq!(texts(&s), vec!["old 4", "old 5", "fresh"]);
    }

    #[test]
    fn age_eviction_stops_at_first_fresh_item() {
        let mut s = store(20, 1, 10);
        let start = Utc::now();
        s.add_at(Role::User, "stale", start);
        s.add_at(Role::User, "fresh", start + Duration::seconds(8));
        // "stale-behind" is older than "fresh" but sits after it in the queue.
        s.items.push_back(MemoryItem {
            role: Role::User,
            text: "stale-behind".into(),
            timestamp: start,
        });
        s.add_at(Role::User, "newest", start + Duration::seconds(12));
        assert_eq!(texts(&s), vec!["fresh", "stale-behind", "newest"]);
    }

    #[test]
    fn age_exactly_at_ttl_is_not_stale() {
        let mut s = store(20, 0, 10);
        let start = Utc::now();
        s.add_at(Role::User, "edge", start);
        s.add_at(Role::User, "now", start + Duration::seconds(10));
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn capacity_pass_runs_before_age_pass() {
        let mut s = store(3, 2, 10);
        let start = Utc::now();
        s.add_at(Role::User, "a", start);
        s.add_at(Role::User, "b", start);
        s.add_at(Role::User, "c", start);
        let evicted = s.add_at(Role::User, "d", start + Duration::seconds(20));
        // capacity drops "a", age drops "b"; floor of 2 protects "c".
        assert_eq!(evicted, 2);
        assert_eq!(texts(&s), vec!["c", "d"]);
    }

    // ── recent ───────────────────────────────────────────────────────────────

    #[test]
    fn recent_returns_latest_in_order() {
        let mut s = ShortTermStore::default();
        for i in 0..5 {
            s.add(Role::User, format!("m{i}"));
        }
        let r = s.recent(3);
        let got: Vec<&str> = r.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(got, vec!["m2", "m3", "m4"]);
    }

    #[test]
    fn recent_with_fewer_items_returns_all() {
        let mut s = ShortTermStore::default();
        s.add(Role::User, "only");
        assert_eq!(s.recent(8), vec![(Role::User, "only".to_string())]);
    }

    #[test]
    fn recent_zero_is_empty() {
        let mut s = ShortTermStore::default();
        s.add(Role::User, "x");
        assert!(s.recent(0).is_empty());
    }

    #[test]
    fn empty_text_is_accepted() {
        let mut s = ShortTermStore::default();
        s.add(Role::System, "");
        assert_eq!(s.len(), 1);
    }
}
