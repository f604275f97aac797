use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::{CounterSnapshot, CounterStore, CounterStoreError};

#[derive(Debug, Clone, Copy)]
struct Entry {
    count: u64,
    expires_at: Instant,
}

/// In-process counters for single-instance deployments and tests
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired counter, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn increment(
        &self,
        key: &str,
        window: Duration,
    ) -> Result<CounterSnapshot, CounterStoreError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;

        let entry = entries
            .entry(key.to_string())
            .and_modify(|entry| {
                if entry.expires_at <= now {
                    *entry = Entry {
                        count: 0,
                        expires_at: now + window,
                    };
                }
            })
            .or_insert(Entry {
                count: 0,
                expires_at: now + window,
            });
        entry.count += 1;

        Ok(CounterSnapshot {
            count: entry.count,
            resets_in: entry.expires_at.saturating_duration_since(now),
        })
    }

    async fn reset(&self, key: &str) -> Result<(), CounterStoreError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_increment_counts_per_key() {
        let store = MemoryCounterStore::new();

        for expected in 1..=3 {
            let snapshot = store.increment("rate-limit-api:1.2.3.4", WINDOW).await.unwrap();
            assert_eq!(snapshot.count, expected);
            assert!(snapshot.resets_in <= WINDOW);
        }

        let other = store.increment("rate-limit-api:5.6.7.8", WINDOW).await.unwrap();
        assert_eq!(other.count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_starts_at_first_hit_and_expires() {
        let store = MemoryCounterStore::new();
        store.increment("k", WINDOW).await.unwrap();

        tokio::time::advance(Duration::from_secs(30)).await;
        let snapshot = store.increment("k", WINDOW).await.unwrap();
        assert_eq!(snapshot.count, 2);
        assert_eq!(snapshot.resets_in, Duration::from_secs(30));

        tokio::time::advance(Duration::from_secs(31)).await;
        let snapshot = store.increment("k", WINDOW).await.unwrap();
        assert_eq!(snapshot.count, 1);
        assert_eq!(snapshot.resets_in, WINDOW);
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired_and_reset() {
        let store = MemoryCounterStore::new();
        store.increment("short", Duration::from_secs(1)).await.unwrap();
        store.increment("long", WINDOW).await.unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(store.purge_expired().await, 1);
        assert_eq!(store.len().await, 1);

        store.reset("long").await.unwrap();
        assert_eq!(store.len().await, 0);
    }
}
