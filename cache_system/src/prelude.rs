//! Convenience re-exports for common cache-system usage

// Core cache system components
pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::errors::CacheError;
pub use crate::query_cache::{CacheStats, QueryCache};

// Re-export centralized config
pub use config::QueryCacheConfig;
