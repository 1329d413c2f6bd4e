//! Cache system for prepared queries
//!
//! This crate provides a bounded, time-limited in-process cache
//! used to avoid recompiling statements the store has already prepared.

pub mod clock;
pub mod errors;
pub mod prelude;
pub mod query_cache;

// Re-export centralized config
pub use config::QueryCacheConfig;

pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::CacheError;
pub use query_cache::{CacheStats, QueryCache};
