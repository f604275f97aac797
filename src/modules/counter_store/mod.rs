//! Counter store backing the rate limiter
//!
//! A counter is keyed by `<policy prefix><client identity>`. The first hit opens a
//! fixed window; the key expires once the window has elapsed.

mod memory;
mod redis_store;

use std::time::Duration;

use async_trait::async_trait;

pub use memory::MemoryCounterStore;
pub use redis_store::RedisCounterStore;

/// State of a counter right after an increment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// Hits recorded in the current window, including this one
    pub count: u64,
    /// Time until the window closes
    pub resets_in: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum CounterStoreError {
    #[error("counter store unavailable: {0}")]
    Unavailable(String),
    #[error("unexpected counter store reply: {0}")]
    Protocol(String),
}

#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically add one hit to `key`, opening a window of `window` on the first hit
    async fn increment(
        &self,
        key: &str,
        window: Duration,
    ) -> Result<CounterSnapshot, CounterStoreError>;

    async fn reset(&self, key: &str) -> Result<(), CounterStoreError>;

    /// Release connections; further calls fail with `Unavailable`
    async fn close(&self) {}
}
