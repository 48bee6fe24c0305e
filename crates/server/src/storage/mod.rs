//! Account storage backend implementations.
//!
//! This module provides concrete implementations of `AccountRepository`
//! from `authbridge_core::storage`:
//!
//! - `inmemory`: HashMap-backed store, lost on restart
//! - `sqlite` (default feature): SQLite store using `rusqlite` and `tokio-rusqlite`

pub mod inmemory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use inmemory::InMemoryRepository;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteRepository;
