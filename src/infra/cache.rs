//! Redis cache implementation.
//!
//! Holds short-lived values that must survive across requests and
//! replicas: pending OAuth `state` values and rate limit counters.

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError};
use serde::Serialize;

use crate::config::{Config, CACHE_PREFIX_OAUTH_STATE, CACHE_PREFIX_RATE_LIMIT, OAUTH_STATE_TTL_SECONDS};
use crate::errors::{AppError, AppResult};

#[cfg(test)]
use mockall::automock;

/// One-time storage for OAuth `state` values.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Remember a freshly issued state
    async fn put_state(&self, state: &str) -> AppResult<()>;

    /// Consume a state; returns false when it was unknown or expired
    async fn take_state(&self, state: &str) -> AppResult<bool>;
}

/// Fixed-window request counter.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Count a request; returns (current_count, is_allowed)
    async fn hit(&self, identifier: &str, max_requests: u64, window_seconds: u64) -> AppResult<(u64, bool)>;
}

/// Redis cache wrapper with connection pooling.
#[derive(Clone)]
pub struct Cache {
    connection: ConnectionManager,
}

impl Cache {
    /// Connect to Redis.
    pub async fn connect(config: &Config) -> Result<Self, RedisError> {
        let client = Client::open(config.redis_url.as_str())?;
        let connection = ConnectionManager::new(client).await?;

        tracing::info!("Redis cache connected");

        Ok(Self { connection })
    }

    /// Set a value in cache with a TTL (in seconds).
    pub async fn set_with_ttl<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: u64,
    ) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let json = serde_json::to_string(value)
            .map_err(|e| AppError::internal(format!("Cache serialization error: {}", e)))?;

        conn.set_ex::<_, _, ()>(key, json, ttl_seconds)
            .await
            .map_err(cache_error)?;

        Ok(())
    }

    /// Delete a key, returning whether it existed.
    pub async fn delete(&self, key: &str) -> AppResult<bool> {
        let mut conn = self.connection.clone();
        let removed: i64 = conn.del(key).await.map_err(cache_error)?;
        Ok(removed > 0)
    }

    /// Check and increment rate limit counter.
    /// Returns (current_count, is_allowed) tuple.
    pub async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<(u64, bool)> {
        let key = format!("{}{}", CACHE_PREFIX_RATE_LIMIT, identifier);
        let mut conn = self.connection.clone();

        let count: i64 = conn.incr(&key, 1).await.map_err(cache_error)?;
        if count == 1 {
            // First request in window
            let _: () = conn
                .expire(&key, window_seconds as i64)
                .await
                .map_err(cache_error)?;
        }

        let count = count.max(0) as u64;
        Ok((count, count <= max_requests))
    }

    /// Check Redis connectivity.
    pub async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(cache_error)?;
        Ok(())
    }
}

#[async_trait]
impl StateStore for Cache {
    async fn put_state(&self, state: &str) -> AppResult<()> {
        let key = oauth_state_key(state);
        self.set_with_ttl(&key, &true, OAUTH_STATE_TTL_SECONDS).await
    }

    async fn take_state(&self, state: &str) -> AppResult<bool> {
        self.delete(&oauth_state_key(state)).await
    }
}

#[async_trait]
impl RateLimiter for Cache {
    async fn hit(&self, identifier: &str, max_requests: u64, window_seconds: u64) -> AppResult<(u64, bool)> {
        self.check_rate_limit(identifier, max_requests, window_seconds).await
    }
}

fn oauth_state_key(state: &str) -> String {
    format!("{}{}", CACHE_PREFIX_OAUTH_STATE, state)
}

/// Convert Redis error to AppError.
fn cache_error(e: RedisError) -> AppError {
    tracing::error!("Redis error: {}", e);
    AppError::internal(format!("Cache error: {}", e))
}
