//! Error types for cache construction
//!
//! Lookups and inserts never fail; a cache that cannot serve a request
//! reports a miss instead.

use thiserror::Error;

/// Cache system errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Invalid cache capacity: {0}")]
    InvalidCapacity(usize),

    #[error("Invalid cache lifetime: {0} ms")]
    InvalidLifetime(u64),
}
