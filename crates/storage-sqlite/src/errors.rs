//! Storage-specific error types for SQLite operations.
//!
//! This module wraps Diesel, r2d2 and filesystem errors and converts them to
//! the database-agnostic error types defined in `pricewatch_core`.

use diesel::result::Error as DieselError;
use pricewatch_core::errors::{DatabaseError, Error};
use thiserror::Error;

/// Storage-specific errors.
///
/// Internal to the storage layer; converted to `pricewatch_core::Error`
/// before being returned to callers.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[from] diesel::ConnectionError),

    #[error("Connection pool error: {0}")]
    PoolError(#[from] r2d2::Error),

    #[error("Query execution failed: {0}")]
    QueryFailed(#[from] DieselError),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Filesystem error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Writer unavailable: {0}")]
    WriterUnavailable(String),

    #[error("Core error: {0}")]
    CoreError(String),
}

/// Convert core Error to StorageError (for the write actor's transaction wrapper)
impl From<Error> for StorageError {
    fn from(err: Error) -> Self {
        StorageError::CoreError(err.to_string())
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ConnectionFailed(e) => {
                Error::Database(DatabaseError::ConnectionFailed(e.to_string()))
            }
            StorageError::PoolError(e) => {
                Error::Database(DatabaseError::PoolCreationFailed(e.to_string()))
            }
            StorageError::QueryFailed(e) => {
                Error::Database(DatabaseError::QueryFailed(e.to_string()))
            }
            StorageError::MigrationFailed(e) => Error::Database(DatabaseError::MigrationFailed(e)),
            StorageError::Io(e) => Error::Database(DatabaseError::ConnectionFailed(e.to_string())),
            StorageError::WriterUnavailable(e) | StorageError::CoreError(e) => {
                Error::Database(DatabaseError::Internal(e))
            }
        }
    }
}

/// Extension trait for converting Diesel and r2d2 Results to core Results.
///
/// We can't implement `From<DieselError> for Error` due to orphan rules, so
/// this goes through [`StorageError`].
pub trait IntoCore<T> {
    fn into_core(self) -> pricewatch_core::Result<T>;
}

impl<T> IntoCore<T> for std::result::Result<T, DieselError> {
    fn into_core(self) -> pricewatch_core::Result<T> {
        self.map_err(|e| StorageError::from(e).into())
    }
}

impl<T> IntoCore<T> for std::result::Result<T, r2d2::Error> {
    fn into_core(self) -> pricewatch_core::Result<T> {
        self.map_err(|e| StorageError::from(e).into())
    }
}
