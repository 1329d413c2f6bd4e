//! Trait definitions
//!
//! This module defines the repository operations exposed to callers.

use crate::query_builder::{Page, PageRequest, Sort};
use crate::RepositoryError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// CRUD, sorting and paging operations for one entity type
#[async_trait]
pub trait CrudRepository: Send + Sync {
    /// The model type stored by this repository
    type Model: Clone + Send + Sync + Debug + Serialize + for<'de> Deserialize<'de>;

    /// The primary key type of the model
    type Id: Clone + Send + Sync + Debug;

    /// Insert or replace an entity
    async fn save(&self, entity: Self::Model) -> Result<Self::Model, RepositoryError>;

    /// Insert or replace several entities, stopping at the first failure
    async fn save_all(
        &self,
        entities: Vec<Self::Model>,
    ) -> Result<Vec<Self::Model>, RepositoryError>;

    async fn find_by_id(&self, id: &Self::Id) -> Result<Option<Self::Model>, RepositoryError>;

    async fn exists_by_id(&self, id: &Self::Id) -> Result<bool, RepositoryError>;

    async fn find_all(&self) -> Result<Vec<Self::Model>, RepositoryError>;

    /// Entities for the given keys; missing keys are skipped
    async fn find_all_by_id(
        &self,
        ids: Vec<Self::Id>,
    ) -> Result<Vec<Self::Model>, RepositoryError>;

    async fn count(&self) -> Result<u64, RepositoryError>;

    /// Returns whether a row was removed
    async fn delete_by_id(&self, id: &Self::Id) -> Result<bool, RepositoryError>;

    async fn delete(&self, entity: &Self::Model) -> Result<bool, RepositoryError>;

    /// Returns the number of rows removed
    async fn delete_all_by_id(&self, ids: Vec<Self::Id>) -> Result<u64, RepositoryError>;

    async fn delete_all_entities(
        &self,
        entities: Vec<Self::Model>,
    ) -> Result<u64, RepositoryError>;

    /// Remove every row of the table
    async fn delete_all(&self) -> Result<u64, RepositoryError>;

    async fn find_all_sorted(&self, sort: &Sort) -> Result<Vec<Self::Model>, RepositoryError>;

    async fn find_all_paged(
        &self,
        request: &PageRequest,
    ) -> Result<Page<Self::Model>, RepositoryError>;
}
