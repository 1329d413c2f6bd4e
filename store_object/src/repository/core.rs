use crate::errors::RepositoryError;
use crate::handle::{NosqlHandle, PreparedStatement, Request, Response};
use crate::options::{
    EntityDefaults, EntityDefaultsRegistry, GlobalDefaults, RequestOptions, ResolvedOptions,
};
use crate::query_builder::Statement;
use crate::traits::NosqlEntity;
use crate::validation::{ValidatedFieldName, ValidatedTableName};
use cache_system::QueryCache;
use config::{Consistency, Durability, NosqlConfig};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Row field holding the result of a count statement
pub(crate) const COUNT_FIELD: &str = "count";
/// Row field holding the result of a delete statement
pub(crate) const DELETED_FIELD: &str = "numRowsDeleted";

/// Repository for one entity type over a shared client handle
///
/// Timeout, consistency and durability set on a repository apply to every
/// request it sends afterwards and to nothing else.
#[derive(Clone)]
pub struct NosqlRepository<T: NosqlEntity> {
    pub(crate) handle: Arc<dyn NosqlHandle>,
    pub(crate) config: Arc<NosqlConfig>,
    pub(crate) query_cache: QueryCache<PreparedStatement>,
    pub(crate) table: ValidatedTableName,
    pub(crate) entity_defaults: Option<EntityDefaults>,
    pub(crate) overrides: RequestOptions,
    pub(crate) _phantom: std::marker::PhantomData<T>,
}

impl<T: NosqlEntity> std::fmt::Debug for NosqlRepository<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NosqlRepository")
            .field("table", &self.table.as_str())
            .field("entity_defaults", &self.entity_defaults)
            .field("overrides", &self.overrides)
            .field("query_cache", &self.query_cache)
            .finish()
    }
}

impl<T: NosqlEntity> NosqlRepository<T> {
    pub fn new(
        handle: Arc<dyn NosqlHandle>,
        config: Arc<NosqlConfig>,
        query_cache: QueryCache<PreparedStatement>,
        entity_defaults: &EntityDefaultsRegistry,
    ) -> Result<Self, RepositoryError> {
        let table = ValidatedTableName::new(T::table_name())?;
        ValidatedFieldName::new(T::primary_key_field())?;

        Ok(Self {
            handle,
            config,
            query_cache,
            table,
            entity_defaults: entity_defaults.get(T::entity_name()).copied(),
            overrides: RequestOptions::default(),
            _phantom: std::marker::PhantomData,
        })
    }

    pub fn table_name(&self) -> &str {
        self.table.as_str()
    }

    pub fn query_cache(&self) -> &QueryCache<PreparedStatement> {
        &self.query_cache
    }

    /// Repository-level overrides as set, before resolution
    pub fn overrides(&self) -> &RequestOptions {
        &self.overrides
    }

    pub fn clear_overrides(&mut self) {
        self.overrides = RequestOptions::default();
    }

    /// Options the next request will carry
    pub fn resolved_options(&self) -> ResolvedOptions {
        ResolvedOptions::resolve(
            &self.overrides,
            self.entity_defaults.as_ref(),
            &GlobalDefaults::from_config(&self.config),
        )
    }

    /// Effective timeout in milliseconds
    pub fn timeout(&self) -> u64 {
        self.resolved_options().timeout_ms
    }

    /// Override the timeout; zero clears the override
    pub fn set_timeout(&mut self, timeout_ms: u64) {
        self.overrides.timeout_ms = timeout_ms;
    }

    pub fn consistency(&self) -> Consistency {
        self.resolved_options().consistency
    }

    /// Override the consistency by name; unknown names are rejected and
    /// leave the current override untouched
    pub fn set_consistency(&mut self, consistency: &str) -> Result<(), RepositoryError> {
        let consistency = consistency.parse::<Consistency>()?;
        self.overrides.consistency = Some(consistency);
        Ok(())
    }

    pub fn set_consistency_value(&mut self, consistency: Consistency) {
        self.overrides.consistency = Some(consistency);
    }

    pub fn durability(&self) -> Durability {
        self.resolved_options().durability
    }

    /// Override the durability by name; unknown names fall back to the
    /// global default durability instead of failing
    pub fn set_durability(&mut self, durability: &str) {
        let durability = match durability.parse::<Durability>() {
            Ok(durability) => durability,
            Err(_) => {
                tracing::debug!(
                    "Unknown durability '{}' for {}, using {}",
                    durability,
                    self.table,
                    self.config.default_durability
                );
                self.config.default_durability
            }
        };
        self.overrides.durability = Some(durability);
    }

    pub fn set_durability_value(&mut self, durability: Durability) {
        self.overrides.durability = Some(durability);
    }

    /// Primary key object for an id
    pub(crate) fn key_for(id: &T::Id) -> Result<Value, RepositoryError> {
        let mut key = Map::new();
        key.insert(T::primary_key_field().to_string(), serde_json::to_value(id)?);
        Ok(Value::Object(key))
    }

    /// Send one request under its timeout
    pub(crate) async fn send(
        &self,
        operation: &str,
        request: Request,
    ) -> Result<Response, RepositoryError> {
        let timeout = request.timeout();
        tracing::trace!(
            "[{}] {} on {} (timeout {} ms)",
            operation,
            request.kind(),
            self.table,
            timeout.as_millis()
        );

        match tokio::time::timeout(timeout, self.handle.execute(request)).await {
            Ok(result) => result.map_err(|e| RepositoryError::from_client(operation, e)),
            Err(_) => Err(RepositoryError::Timeout {
                operation: operation.to_string(),
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }

    /// Prepared form of a statement, compiled on cache miss
    pub(crate) async fn prepare(
        &self,
        statement: &Statement,
        options: &ResolvedOptions,
    ) -> Result<PreparedStatement, RepositoryError> {
        let key = statement.text();
        let timeout = options.timeout();

        self.query_cache
            .get_or_try_insert_with(&key, move || async move {
                tracing::debug!("Preparing statement for {}: {}", self.table, statement.text());
                let response = self
                    .send(
                        "prepare",
                        Request::Prepare {
                            statement: statement.clone(),
                            timeout,
                        },
                    )
                    .await?;
                match response {
                    Response::Prepared(prepared) => Ok(prepared),
                    other => Err(RepositoryError::unexpected("prepare", &other)),
                }
            })
            .await
    }

    /// Prepare (or reuse) and execute a statement, returning its rows
    pub(crate) async fn run_statement(
        &self,
        operation: &str,
        statement: &Statement,
    ) -> Result<Vec<Value>, RepositoryError> {
        let options = self.resolved_options();
        let prepared = self.prepare(statement, &options).await?;

        let response = self
            .send(
                operation,
                Request::Query {
                    prepared,
                    consistency: options.consistency,
                    durability: options.durability,
                    timeout: options.timeout(),
                },
            )
            .await?;

        match response {
            Response::Rows(rows) => Ok(rows),
            other => Err(RepositoryError::unexpected(operation, &other)),
        }
    }

    pub(crate) fn rows_to_models(rows: Vec<Value>) -> Result<Vec<T>, RepositoryError> {
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(RepositoryError::from))
            .collect()
    }

    /// Numeric field of the single row returned by count/delete statements
    pub(crate) fn single_number(
        operation: &str,
        rows: &[Value],
        field: &str,
    ) -> Result<u64, RepositoryError> {
        rows.first()
            .and_then(|row| row.get(field))
            .and_then(Value::as_u64)
            .ok_or_else(|| RepositoryError::UnexpectedResponse {
                operation: operation.to_string(),
                response: format!("missing numeric '{}' field", field),
            })
    }

    /// Execute a named or derived statement and map its rows to entities
    pub async fn find_by_statement(&self, statement: &Statement) -> Result<Vec<T>, RepositoryError> {
        let rows = self.run_statement("find_by_statement", statement).await?;
        Self::rows_to_models(rows)
    }

    /// Execute a counting statement whose single row carries a `count` field
    pub async fn count_by_statement(&self, statement: &Statement) -> Result<u64, RepositoryError> {
        let rows = self.run_statement("count_by_statement", statement).await?;
        Self::single_number("count_by_statement", &rows, COUNT_FIELD)
    }
}
