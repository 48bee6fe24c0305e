//! SQLite storage backend.
//!
//! Implements `AccountRepository` using `rusqlite` through the async
//! `tokio-rusqlite` connection wrapper.

mod conversions;
mod error;
mod repository;
mod schema;

pub use repository::SqliteRepository;
