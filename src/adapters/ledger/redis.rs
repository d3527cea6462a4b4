//! Redis-backed intervention ledger for multi-worker deployments.
//!
//! Each user has three keys:
//!
//! ```text
//! {prefix}:{user}:recorded   SET of check-in ids already counted
//! {prefix}:{user}:count      INCR counter
//! {prefix}:{user}:last       RFC 3339 timestamp of the last counted crisis
//! ```
//!
//! The check-and-increment runs as one Lua script, so concurrent workers
//! and replays see a single atomic step.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Script};

use crate::domain::foundation::{CheckInId, DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::{InterventionLedger, LedgerEntry};

const DEFAULT_PREFIX: &str = "checkin_sentinel:ledger";

static RECORD_CRISIS: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r"
        if redis.call('SADD', KEYS[1], ARGV[1]) == 1 then
            local count = redis.call('INCR', KEYS[2])
            redis.call('SET', KEYS[3], ARGV[2])
            return count
        end
        return tonumber(redis.call('GET', KEYS[2]) or '0')
        ",
    )
});

#[derive(Clone)]
pub struct RedisInterventionLedger {
    conn: MultiplexedConnection,
    prefix: String,
}

impl RedisInterventionLedger {
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

    fn key(&self, user_id: &UserId, suffix: &str) -> String {
        user_key(&self.prefix, user_id, suffix)
    }
}

fn user_key(prefix: &str, user_id: &UserId, suffix: &str) -> String {
    format!("{}:{}:{}", prefix, user_id, suffix)
}

fn cache_error(e: redis::RedisError) -> DomainError {
    DomainError::new(ErrorCode::CacheError, format!("Ledger store error: {}", e))
}

#[async_trait]
impl InterventionLedger for RedisInterventionLedger {
    async fn record_crisis(
        &self,
        user_id: &UserId,
        checkin_id: &CheckInId,
        at: Timestamp,
    ) -> Result<u64, DomainError> {
        let mut conn = self.conn.clone();
        let count: i64 = RECORD_CRISIS
            .key(self.key(user_id, "recorded"))
            .key(self.key(user_id, "count"))
            .key(self.key(user_id, "last"))
            .arg(checkin_id.as_str())
            .arg(at.to_rfc3339())
            .invoke_async(&mut conn)
            .await
            .map_err(cache_error)?;
        Ok(count.max(0) as u64)
    }

    async fn snapshot(&self, user_id: &UserId) -> Result<LedgerEntry, DomainError> {
        let mut conn = self.conn.clone();
        let count: Option<u64> = conn
            .get(self.key(user_id, "count"))
            .await
            .map_err(cache_error)?;
        let last: Option<String> = conn
            .get(self.key(user_id, "last"))
            .await
            .map_err(cache_error)?;

        let last_crisis_timestamp = last
            .map(|raw| {
                Timestamp::parse_rfc3339(&raw).map_err(|e| {
                    DomainError::new(
                        ErrorCode::CacheError,
                        format!("Corrupt ledger timestamp '{}': {}", raw, e),
                    )
                })
            })
            .transpose()?;

        Ok(LedgerEntry {
            crisis_intervention_count: count.unwrap_or(0),
            last_crisis_timestamp,
        })
    }
}
