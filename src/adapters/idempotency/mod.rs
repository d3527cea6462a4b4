//! Delivery idempotency stores.
//!
//! - `InMemoryDeliveryStore` - Single-process claims with tokio-clock expiry
//! - `RedisDeliveryStore` - `SET NX PX` claims shared across workers

mod in_memory;
mod redis;

pub use in_memory::InMemoryDeliveryStore;
pub use self::redis::RedisDeliveryStore;
