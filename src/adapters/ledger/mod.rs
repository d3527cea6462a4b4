//! Intervention ledger adapters.
//!
//! - `InMemoryInterventionLedger` - Mutex-guarded map for tests and single process
//! - `RedisInterventionLedger` - Atomic Lua script for multi-worker deployments

mod in_memory;
mod redis;

pub use in_memory::InMemoryInterventionLedger;
pub use self::redis::RedisInterventionLedger;
