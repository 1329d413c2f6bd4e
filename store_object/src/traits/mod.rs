//! Traits for repository operations
//!
//! This module contains the entity contract and the repository interfaces.

pub mod core;
pub mod entity;
pub mod reactive;

// Re-export all public items for convenience
pub use core::CrudRepository;
pub use entity::NosqlEntity;
pub use reactive::ReactiveCrudRepository;
