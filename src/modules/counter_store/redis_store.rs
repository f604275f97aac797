//! Redis-backed counters shared by every API instance.
//!
//! INCR and the first-hit PEXPIRE run in one Lua script so concurrent requests
//! never observe a counter without an expiry.

use std::time::Duration;

use async_trait::async_trait;
use redis::{
    aio::{ConnectionManager, ConnectionManagerConfig},
    AsyncCommands, Client, Script,
};
use tokio::sync::RwLock;
use tracing::info;

use super::{CounterSnapshot, CounterStore, CounterStoreError};
use crate::core::config::RedisConfig;

const INCREMENT_SCRIPT: &str = r"
local count = redis.call('INCR', KEYS[1])
if count == 1 then
    redis.call('PEXPIRE', KEYS[1], ARGV[1])
end
return {count, redis.call('PTTL', KEYS[1])}
";

pub struct RedisCounterStore {
    connection: RwLock<Option<ConnectionManager>>,
    script: Script,
}

impl RedisCounterStore {
    /// Connect at start-up; fails if Redis is unreachable after the configured retries
    pub async fn connect(config: &RedisConfig) -> Result<Self, CounterStoreError> {
        let manager_config = ConnectionManagerConfig::new()
            .set_number_of_retries(config.max_retries)
            .set_connection_timeout(Some(Duration::from_secs(2)));

        let client = Client::open(config.url())
            .map_err(|e| CounterStoreError::Unavailable(format!("invalid Redis URL: {}", e)))?;
        let manager = client
            .get_connection_manager_with_config(manager_config)
            .await
            .map_err(|e| CounterStoreError::Unavailable(e.to_string()))?;

        info!("Connected to Redis at {}:{}", config.host, config.port);

        Ok(Self {
            connection: RwLock::new(Some(manager)),
            script: Script::new(INCREMENT_SCRIPT),
        })
    }

    async fn manager(&self) -> Result<ConnectionManager, CounterStoreError> {
        self.connection
            .read()
            .await
            .clone()
            .ok_or_else(|| CounterStoreError::Unavailable("connection closed".to_string()))
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn increment(
        &self,
        key: &str,
        window: Duration,
    ) -> Result<CounterSnapshot, CounterStoreError> {
        let mut conn = self.manager().await?;
        let window_ms = window.as_millis() as u64;

        let (count, ttl_ms): (i64, i64) = self
            .script
            .key(key)
            .arg(window_ms)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| CounterStoreError::Unavailable(e.to_string()))?;

        if count < 1 {
            return Err(CounterStoreError::Protocol(format!(
                "counter for '{}' returned {}",
                key, count
            )));
        }

        // PTTL is negative when the key has no expiry; treat it as a full window
        let resets_in = if ttl_ms >= 0 {
            Duration::from_millis(ttl_ms as u64)
        } else {
            window
        };

        Ok(CounterSnapshot {
            count: count as u64,
            resets_in,
        })
    }

    async fn reset(&self, key: &str) -> Result<(), CounterStoreError> {
        let mut conn = self.manager().await?;
        let _: i64 = conn
            .del(key)
            .await
            .map_err(|e| CounterStoreError::Unavailable(e.to_string()))?;
        Ok(())
    }

    async fn close(&self) {
        if self.connection.write().await.take().is_some() {
            info!("Redis connection closed");
        }
    }
}
