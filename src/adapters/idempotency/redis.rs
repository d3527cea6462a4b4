//! Redis-backed delivery store.
//!
//! ```text
//! {prefix}:delivered:{key}   permanent marker
//! {prefix}:claim:{key}       SET NX PX, expires with the claim ttl
//! ```

use async_trait::async_trait;
use once_cell::sync::Lazy;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Script};
use std::time::Duration;

use crate::domain::alert::IdempotencyKey;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{ClaimOutcome, DeliveryStore};

const DEFAULT_PREFIX: &str = "checkin_sentinel:delivery";

/// Returns 2 if delivered, 1 if newly claimed, 0 if another claim is live.
static CLAIM: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r"
        if redis.call('EXISTS', KEYS[1]) == 1 then
            return 2
        end
        if redis.call('SET', KEYS[2], '1', 'NX', 'PX', ARGV[1]) then
            return 1
        end
        return 0
        ",
    )
});

#[derive(Clone)]
pub struct RedisDeliveryStore {
    conn: MultiplexedConnection,
    prefix: String,
}

impl RedisDeliveryStore {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self {
            conn,
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    fn delivered_key(&self, key: &IdempotencyKey) -> String {
        format!("{}:delivered:{}", self.prefix, key)
    }

    fn claim_key(&self, key: &IdempotencyKey) -> String {
        format!("{}:claim:{}", self.prefix, key)
    }
}

fn cache_error(e: redis::RedisError) -> DomainError {
    DomainError::new(ErrorCode::CacheError, format!("Delivery store error: {}", e))
}

#[async_trait]
impl DeliveryStore for RedisDeliveryStore {
    async fn claim(&self, key: &IdempotencyKey, ttl: Duration) -> Result<ClaimOutcome, DomainError> {
        let mut conn = self.conn.clone();
        let ttl_ms = ttl.as_millis().max(1) as u64;
        let result: i64 = CLAIM
            .key(self.delivered_key(key))
            .key(self.claim_key(key))
            .arg(ttl_ms)
            .invoke_async(&mut conn)
            .await
            .map_err(cache_error)?;
        Ok(match result {
            2 => ClaimOutcome::AlreadyDelivered,
            1 => ClaimOutcome::Claimed,
            _ => ClaimOutcome::InFlight,
        })
    }

    async fn mark_delivered(&self, key: &IdempotencyKey) -> Result<(), DomainError> {
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(self.delivered_key(key), 1)
            .await
            .map_err(cache_error)?;
        conn.del::<_, ()>(self.claim_key(key)).await.map_err(cache_error)
    }

    async fn release(&self, key: &IdempotencyKey) -> Result<(), DomainError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(self.claim_key(key)).await.map_err(cache_error)
    }

    async fn is_delivered(&self, key: &IdempotencyKey) -> Result<bool, DomainError> {
        let mut conn = self.conn.clone();
        conn.exists(self.delivered_key(key)).await.map_err(cache_error)
    }
}
