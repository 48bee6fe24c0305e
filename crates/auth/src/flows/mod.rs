//! Storage for in-flight social logins.
//!
//! Provides `AuthFlowRepository` implementations for:
//! - In-memory (always available)
//! - SQLite (with `sqlite` feature)
//! - Redis (with `redis` feature)

mod inmemory;
#[cfg(feature = "redis")]
mod redis_impl;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use inmemory::InMemoryFlowStore;
#[cfg(feature = "redis")]
pub use redis_impl::RedisFlowStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteFlowStore;
