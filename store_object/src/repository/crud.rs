//! CrudRepository implementation over the client handle

use super::core::{NosqlRepository, COUNT_FIELD, DELETED_FIELD};
use crate::errors::RepositoryError;
use crate::handle::{Request, Response};
use crate::query_builder::{Page, PageRequest, Sort, Statement};
use crate::traits::{CrudRepository, NosqlEntity};
use async_trait::async_trait;

impl<T: NosqlEntity> NosqlRepository<T> {
    fn require_id(entity: &T) -> Result<T::Id, RepositoryError> {
        entity.id().ok_or_else(|| {
            RepositoryError::Validation(format!(
                "{} entity has no value for primary key '{}'",
                T::table_name(),
                T::primary_key_field()
            ))
        })
    }
}

#[async_trait]
impl<T: NosqlEntity> CrudRepository for NosqlRepository<T> {
    type Model = T;
    type Id = T::Id;

    async fn save(&self, entity: Self::Model) -> Result<Self::Model, RepositoryError> {
        let id = Self::require_id(&entity)?;
        let key = Self::key_for(&id)?;
        let row = serde_json::to_value(&entity)?;
        if !row.is_object() {
            return Err(RepositoryError::Validation(format!(
                "{} must serialize to an object",
                T::table_name()
            )));
        }

        let options = self.resolved_options();
        let response = self
            .send(
                "save",
                Request::Put {
                    table: self.table.to_string(),
                    key,
                    row,
                    durability: options.durability,
                    timeout: options.timeout(),
                },
            )
            .await?;

        match response {
            Response::Written => Ok(entity),
            other => Err(RepositoryError::unexpected("save", &other)),
        }
    }

    async fn save_all(
        &self,
        entities: Vec<Self::Model>,
    ) -> Result<Vec<Self::Model>, RepositoryError> {
        let mut saved = Vec::with_capacity(entities.len());
        for entity in entities {
            saved.push(self.save(entity).await?);
        }
        Ok(saved)
    }

    async fn find_by_id(&self, id: &Self::Id) -> Result<Option<Self::Model>, RepositoryError> {
        let options = self.resolved_options();
        let response = self
            .send(
                "find_by_id",
                Request::Get {
                    table: self.table.to_string(),
                    key: Self::key_for(id)?,
                    consistency: options.consistency,
                    timeout: options.timeout(),
                },
            )
            .await?;

        match response {
            Response::Row(Some(row)) => Ok(Some(serde_json::from_value(row)?)),
            Response::Row(None) => Ok(None),
            other => Err(RepositoryError::unexpected("find_by_id", &other)),
        }
    }

    async fn exists_by_id(&self, id: &Self::Id) -> Result<bool, RepositoryError> {
        Ok(self.find_by_id(id).await?.is_some())
    }

    async fn find_all(&self) -> Result<Vec<Self::Model>, RepositoryError> {
        let statement = Statement::select_all(&self.table);
        let rows = self.run_statement("find_all", &statement).await?;
        Self::rows_to_models(rows)
    }

    async fn find_all_by_id(
        &self,
        ids: Vec<Self::Id>,
    ) -> Result<Vec<Self::Model>, RepositoryError> {
        let mut found = Vec::with_capacity(ids.len());
        for id in &ids {
            if let Some(entity) = self.find_by_id(id).await? {
                found.push(entity);
            }
        }
        Ok(found)
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let statement = Statement::count(&self.table);
        let rows = self.run_statement("count", &statement).await?;
        Self::single_number("count", &rows, COUNT_FIELD)
    }

    async fn delete_by_id(&self, id: &Self::Id) -> Result<bool, RepositoryError> {
        let options = self.resolved_options();
        let response = self
            .send(
                "delete_by_id",
                Request::Delete {
                    table: self.table.to_string(),
                    key: Self::key_for(id)?,
                    durability: options.durability,
                    timeout: options.timeout(),
                },
            )
            .await?;

        match response {
            Response::Deleted(deleted) => Ok(deleted),
            other => Err(RepositoryError::unexpected("delete_by_id", &other)),
        }
    }

    async fn delete(&self, entity: &Self::Model) -> Result<bool, RepositoryError> {
        let id = Self::require_id(entity)?;
        self.delete_by_id(&id).await
    }

    async fn delete_all_by_id(&self, ids: Vec<Self::Id>) -> Result<u64, RepositoryError> {
        let mut deleted = 0;
        for id in &ids {
            if self.delete_by_id(id).await? {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    async fn delete_all_entities(
        &self,
        entities: Vec<Self::Model>,
    ) -> Result<u64, RepositoryError> {
        let ids = entities
            .iter()
            .map(Self::require_id)
            .collect::<Result<Vec<_>, _>>()?;
        self.delete_all_by_id(ids).await
    }

    async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let statement = Statement::delete_all(&self.table);
        let rows = self.run_statement("delete_all", &statement).await?;
        let deleted = Self::single_number("delete_all", &rows, DELETED_FIELD)?;
        tracing::debug!("Deleted {} rows from {}", deleted, self.table);
        Ok(deleted)
    }

    async fn find_all_sorted(&self, sort: &Sort) -> Result<Vec<Self::Model>, RepositoryError> {
        let statement = Statement::select_all(&self.table).order_by(sort)?;
        let rows = self.run_statement("find_all_sorted", &statement).await?;
        Self::rows_to_models(rows)
    }

    async fn find_all_paged(
        &self,
        request: &PageRequest,
    ) -> Result<Page<Self::Model>, RepositoryError> {
        if request.size == 0 {
            return Err(RepositoryError::Validation(
                "Page size must be greater than 0".to_string(),
            ));
        }

        let statement = Statement::select_all(&self.table)
            .order_by(&request.sort)?
            .limit(request.size)
            .offset(request.offset());
        let rows = self.run_statement("find_all_paged", &statement).await?;
        let content = Self::rows_to_models(rows)?;
        let total = self.count().await?;

        Ok(Page::new(content, request, total))
    }
}
