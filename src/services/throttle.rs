//! In-process rate-limit store for the OTP request endpoint.
//!
//! Counters are keyed by identity plus a fixed time-window bucket, so a new
//! window starts with a fresh count. Stale buckets are pruned as requests
//! come through.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

pub struct ThrottleStore {
    limit: u32,
    window_secs: i64,
    hits: Mutex<HashMap<(String, i64), u32>>,
}

impl ThrottleStore {
    pub fn new(limit: u32, window_secs: i64) -> Self {
        ThrottleStore {
            limit,
            window_secs,
            hits: Mutex::new(HashMap::new()),
        }
    }

    /// Record a hit for `identity` at `now`. Returns false once the hit
    /// count for the current window exceeds the limit.
    pub fn check(&self, identity: &str, now: DateTime<Utc>) -> bool {
        let bucket = now.timestamp().div_euclid(self.window_secs);
        let mut hits = self.hits.lock().unwrap_or_else(|e| e.into_inner());

        hits.retain(|(_, b), _| *b >= bucket);

        let count = hits
            .entry((identity.to_string(), bucket))
            .and_modify(|c| *c += 1)
            .or_insert(1);
        *count <= self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn allows_up_to_limit_within_one_window() {
        let store = ThrottleStore::new(3, 600);
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();

        assert!(store.check("a@x.com", now));
        assert!(store.check("a@x.com", now));
        assert!(store.check("a@x.com", now));
        assert!(!store.check("a@x.com", now));
    }

    #[test]
    fn identities_are_counted_separately() {
        let store = ThrottleStore::new(1, 600);
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();

        assert!(store.check("a@x.com", now));
        assert!(store.check("b@y.com", now));
        assert!(!store.check("a@x.com", now));
    }

    #[test]
    fn a_new_window_resets_the_count() {
        let store = ThrottleStore::new(1, 600);
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let later = now + chrono::Duration::seconds(600);

        assert!(store.check("a@x.com", now));
        assert!(!store.check("a@x.com", now));
        assert!(store.check("a@x.com", later));
    }
}
