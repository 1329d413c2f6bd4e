//! Error types for the NosqlHaus crate
//!
//! This module contains all error types that can be returned by NosqlHaus operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NosqlHausError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Query cache error: {0}")]
    Cache(#[from] cache_system::CacheError),

    #[error("Connection error: {0}")]
    Connection(#[from] store_object::ClientError),

    #[error("Repository error: {0}")]
    Repository(#[from] store_object::RepositoryError),

    #[error("Handle factory is closed")]
    Closed,
}
