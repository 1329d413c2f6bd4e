//! Convenience re-exports for common NosqlHaus usage
//!
//! This prelude module re-exports the most commonly used items from the NosqlHaus ecosystem,
//! making it easier to import everything you need with a single use statement.
//!
//! # Example
//!
//! ```rust
//! use nosqlhaus::prelude::*;
//!
//! // Now you have access to all the common NosqlHaus types and traits
//! ```

// Core NosqlHaus components
pub use crate::core::NosqlHaus;
pub use crate::errors::NosqlHausError;
pub use crate::user_agent::LIBRARY_ID;

// Re-export centralized config
pub use config::{
    AuthConfig, CapacityMode, ConfigError, HandleConfig, NosqlConfig, QueryCacheConfig,
    TableDefaults,
};

// Re-export commonly used store-object types for convenience
pub use store_object::prelude::*;

// Re-export cache system
pub use cache_system::prelude::*;

// Common external dependencies
pub use anyhow;
pub use async_trait;
pub use tokio;
