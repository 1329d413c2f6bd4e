//! Store Object - Repository layer for NosqlHaus
//!
//! This crate provides the driver boundary, the entity contract, request
//! option resolution and the generic repository built on top of them.

pub mod auth;
pub mod errors;
pub mod handle;
pub mod options;
pub mod prelude;
pub mod query_builder;
pub mod repository;
pub mod simulator;
pub mod traits;
pub mod validation;

pub use auth::{AuthorizationProvider, SimulatedAuthProvider, StaticTokenProvider};
pub use errors::{ClientError, RepositoryError};
pub use handle::{HandleConnector, NosqlHandle, PreparedStatement, Request, Response};
pub use options::{
    EntityDefaults, EntityDefaultsRegistry, GlobalDefaults, RequestOptions, ResolvedOptions,
};
pub use query_builder::{Page, PageRequest, Sort, SortOrder, Statement, StatementKind};
pub use repository::NosqlRepository;
pub use simulator::{MemoryConnector, MemoryHandle};
pub use traits::*;
pub use validation::{Identifier, ValidatedFieldName, ValidatedTableName, ValidationError};
