use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use jiff::{SignedDuration, Timestamp};
use keel_core::Clock;
use tokio::sync::Mutex;

/// Last-checked bookkeeping behind every in-memory `PeriodicallyChecked`.
pub struct CheckTracker<K> {
    clock: Arc<dyn Clock>,
    last_checked: Mutex<HashMap<K, Option<Timestamp>>>,
}

impl<K> CheckTracker<K>
where
    K: Clone + Eq + Hash + Ord + Send,
{
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last_checked: Mutex::new(HashMap::new()),
        }
    }

    /// Start tracking a key as never checked. Already-tracked keys keep their timestamp.
    pub async fn track(&self, key: K) {
        self.last_checked.lock().await.entry(key).or_insert(None);
    }

    pub async fn untrack(&self, key: &K) {
        self.last_checked.lock().await.remove(key);
    }

    pub async fn last_checked(&self, key: &K) -> Option<Timestamp> {
        self.last_checked.lock().await.get(key).copied().flatten()
    }

    /// Select up to `limit` keys not checked since `now - min_age` and mark them checked now.
    ///
    /// Selection and marking happen under one lock.
    pub async fn check_out(&self, min_age: SignedDuration, limit: usize) -> Vec<K> {
        let now = self.clock.now();
        // An interval reaching past the earliest timestamp leaves only never-checked keys due.
        let cutoff = now.checked_sub(min_age).ok();

        let mut last_checked = self.last_checked.lock().await;
        let mut due: Vec<(Option<Timestamp>, K)> = last_checked
            .iter()
            .filter(|(_, last)| last.is_none_or(|at| cutoff.is_some_and(|cutoff| at <= cutoff)))
            .map(|(key, last)| (*last, key.clone()))
            .collect();

        // never-checked (None) sorts first, then oldest
        due.sort();
        due.truncate(limit);

        for (_, key) in &due {
            last_checked.insert(key.clone(), Some(now));
        }

        due.into_iter().map(|(_, key)| key).collect()
    }
}
