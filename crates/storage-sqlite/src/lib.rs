//! SQLite storage implementation for Pricewatch.
//!
//! This crate provides the durable sample store using Diesel with SQLite.
//! It implements the [`SampleStore`](pricewatch_core::SampleStore) trait
//! defined in `pricewatch-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - A single writer actor that serializes all writes
//! - The price sample repository
//!
//! # Architecture
//!
//! This crate is the only place in the workspace where Diesel dependencies
//! exist. `core` is database-agnostic and works with traits.
//!
//! ```text
//!          core (domain)
//!                │
//!                ▼
//!     storage-sqlite (this crate)
//!                │
//!                ▼
//!            SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod prices;
pub mod schema;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use prices::SampleRepository;

// Re-export from pricewatch-core for convenience
pub use pricewatch_core::errors::{DatabaseError, Error, Result};
