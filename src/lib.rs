//! # NosqlHaus
//!
//! Repository abstraction for NoSQL stores: one lazily created client handle
//! per factory, per-repository request options layered over per-entity and
//! global defaults, and a bounded cache of prepared statements.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nosqlhaus::prelude::*;
//! use std::sync::Arc;
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct User {
//!     pub id: u64,
//!     pub name: String,
//! }
//!
//! impl NosqlEntity for User {
//!     type Id = u64;
//!
//!     fn table_name() -> &'static str {
//!         "users"
//!     }
//!
//!     fn id(&self) -> Option<u64> {
//!         Some(self.id)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = NosqlConfig::new(HandleConfig::new(
//!         "http://localhost:8080",
//!         AuthConfig::Simulated,
//!     ));
//!
//!     let mut nosqlhaus = NosqlHaus::new(config, Arc::new(MemoryConnector::new()))?;
//!     nosqlhaus.register_defaults_for::<User>(
//!         EntityDefaults::new().with_consistency(Consistency::Absolute),
//!     );
//!
//!     let mut users = nosqlhaus.repository::<User>().await?;
//!     users.set_timeout(2000);
//!
//!     users.save(User { id: 1, name: "John Doe".to_string() }).await?;
//!     let found = users.find_by_id(&1).await?;
//!     println!("Found user: {:?}", found);
//!
//!     nosqlhaus.close().await?;
//!     Ok(())
//! }
//! ```

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod core;
pub mod errors;
pub mod prelude;
pub mod user_agent;

// Re-export the main public types for convenience
pub use core::NosqlHaus;
pub use errors::NosqlHausError;
pub use user_agent::{LIBRARY_ID, negotiate_user_agent};

// Re-export centralized config
pub use config::{
    AuthConfig, CapacityMode, Consistency, Durability, HandleConfig, NosqlConfig,
    QueryCacheConfig, TableDefaults,
};

// Re-export internal crates used by the public API
pub use cache_system;
pub use store_object;

// Re-export external dependencies used in public API
pub use async_trait;
