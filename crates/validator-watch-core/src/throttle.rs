//! Alert throttling.
//!
//! Remembers when each alert key last paged and suppresses repeats inside the
//! caller's cooldown window. Keys are few (one per alert kind plus one per
//! distinct error message), so the table is only pruned of entries that are
//! older than every cooldown in use.

use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

use crate::clock::Clock;

pub struct AlertThrottle {
    last_alert: DashMap<String, DateTime<Utc>>,
    clock: Arc<dyn Clock>,
}

impl AlertThrottle {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { last_alert: DashMap::new(), clock }
    }

    /// Returns true if `key` may alert now, and records the alert if so.
    ///
    /// The first call for a key always passes. Later calls pass only once
    /// strictly more than `cooldown_secs` have elapsed since the last
    /// recorded alert; suppressed calls leave the recorded time untouched.
    pub fn should_alert(&self, key: &str, cooldown_secs: u64) -> bool {
        let now = self.clock.now();

        match self.last_alert.entry(key.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(now);
                true
            },
            Entry::Occupied(mut slot) => {
                let elapsed_ms = now.signed_duration_since(*slot.get()).num_milliseconds();
                let cooldown_ms = i64::try_from(cooldown_secs)
                    .unwrap_or(i64::MAX / 1000)
                    .saturating_mul(1000);
                if elapsed_ms > cooldown_ms {
                    slot.insert(now);
                    true
                } else {
                    false
                }
            },
        }
    }

    /// Drop entries last alerted more than `max_age` ago. Returns how many were removed.
    pub fn prune_older_than(&self, max_age: Duration) -> usize {
        let cutoff = self.clock.now() - max_age;
        let before = self.last_alert.len();
        self.last_alert.retain(|_, last| *last > cutoff);
        before.saturating_sub(self.last_alert.len())
    }

    /// Time `key` last passed the throttle.
    pub fn last_alerted(&self, key: &str) -> Option<DateTime<Utc>> {
        self.last_alert.get(key).map(|entry| *entry.value())
    }

    pub fn len(&self) -> usize {
        self.last_alert.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_alert.is_empty()
    }
}
