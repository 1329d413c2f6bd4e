//! Convenience re-exports for common store-object usage

// Core traits
pub use crate::traits::{CrudRepository, NosqlEntity, ReactiveCrudRepository};

// Error types
pub use crate::errors::{ClientError, RepositoryError};

// Driver boundary
pub use crate::auth::{AuthorizationProvider, SimulatedAuthProvider, StaticTokenProvider};
pub use crate::handle::{HandleConnector, NosqlHandle, PreparedStatement, Request, Response};

// Repository and option resolution
pub use crate::options::{EntityDefaults, EntityDefaultsRegistry, RequestOptions};
pub use crate::repository::NosqlRepository;

// Statements and paging
pub use crate::query_builder::{Page, PageRequest, Sort, SortOrder, Statement};

// Local simulator
pub use crate::simulator::{MemoryConnector, MemoryHandle};

// Common external dependencies that are frequently used
pub use async_trait::async_trait;
pub use config::{Consistency, Durability};
pub use serde::{Deserialize, Serialize};
