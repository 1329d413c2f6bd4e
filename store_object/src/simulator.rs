//! In-memory store simulator
//!
//! [`MemoryHandle`] answers requests from process memory so repositories can
//! run without a live service. It understands statements built with
//! [`crate::query_builder::Statement`]; native statement text is rejected at
//! prepare time.

use crate::auth::AuthorizationProvider;
use crate::errors::ClientError;
use crate::handle::{HandleConnector, NosqlHandle, PreparedStatement, Request, Response};
use crate::query_builder::{SortOrder, Statement, StatementKind};
use async_trait::async_trait;
use config::HandleConfig;
use serde_json::{json, Value};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Table = BTreeMap<String, Value>;

#[derive(Debug)]
pub struct MemoryHandle {
    auth: Arc<dyn AuthorizationProvider>,
    user_agent: String,
    latency: Option<Duration>,
    tables: Mutex<HashMap<String, Table>>,
    recorded: Mutex<Vec<Request>>,
    next_plan_id: AtomicU64,
    prepare_count: AtomicU64,
    close_count: AtomicU64,
    closed: AtomicBool,
}

impl MemoryHandle {
    pub fn new(auth: Arc<dyn AuthorizationProvider>, user_agent: impl Into<String>) -> Self {
        Self {
            auth,
            user_agent: user_agent.into(),
            latency: None,
            tables: Mutex::new(HashMap::new()),
            recorded: Mutex::new(Vec::new()),
            next_plan_id: AtomicU64::new(1),
            prepare_count: AtomicU64::new(0),
            close_count: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        }
    }

    /// Delay every request, e.g. to exercise timeouts
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Number of prepare requests served
    pub fn prepare_count(&self) -> u64 {
        self.prepare_count.load(AtomicOrdering::SeqCst)
    }

    /// Number of times `close` actually closed the handle
    pub fn close_count(&self) -> u64 {
        self.close_count.load(AtomicOrdering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(AtomicOrdering::SeqCst)
    }

    /// Every request received, in arrival order
    pub fn recorded_requests(&self) -> Vec<Request> {
        self.recorded.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn last_request(&self) -> Option<Request> {
        self.recorded.lock().ok().and_then(|r| r.last().cloned())
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.tables
            .lock()
            .map(|t| t.get(table).map(|rows| rows.len()).unwrap_or(0))
            .unwrap_or(0)
    }

    fn authorize(&self) -> Result<(), ClientError> {
        let authorization = self.auth.authorization_string()?;
        if !authorization.starts_with("Bearer ") {
            return Err(ClientError::Unauthorized(
                "authorization must be a bearer token".to_string(),
            ));
        }
        Ok(())
    }

    fn key_string(key: &Value) -> Result<String, ClientError> {
        serde_json::to_string(key).map_err(|e| ClientError::Request(e.to_string()))
    }

    fn prepare(&self, statement: Statement) -> Result<Response, ClientError> {
        if statement.kind() == StatementKind::Native {
            return Err(ClientError::Request(format!(
                "simulator cannot compile statement: {}",
                statement.text()
            )));
        }
        self.prepare_count.fetch_add(1, AtomicOrdering::SeqCst);
        let plan_id = self.next_plan_id.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(Response::Prepared(PreparedStatement::new(statement, plan_id)))
    }

    fn query(
        tables: &mut HashMap<String, Table>,
        prepared: &PreparedStatement,
    ) -> Result<Response, ClientError> {
        let statement = &prepared.statement;
        let table = statement
            .table()
            .map(|t| t.as_str().to_string())
            .ok_or_else(|| ClientError::Request("statement has no table".to_string()))?;

        match statement.kind() {
            StatementKind::Select => {
                let mut rows: Vec<Value> = tables
                    .get(&table)
                    .map(|t| t.values().cloned().collect())
                    .unwrap_or_default();

                if !statement.sort_keys().is_empty() {
                    rows.sort_by(|a, b| {
                        for (field, order) in statement.sort_keys() {
                            let ordering = compare_values(a.get(field.as_str()), b.get(field.as_str()));
                            let ordering = match order {
                                SortOrder::Asc => ordering,
                                SortOrder::Desc => ordering.reverse(),
                            };
                            if ordering != Ordering::Equal {
                                return ordering;
                            }
                        }
                        Ordering::Equal
                    });
                }

                let offset = statement.offset_value().unwrap_or(0) as usize;
                let limit = statement.limit_value().map(|l| l as usize).unwrap_or(usize::MAX);
                Ok(Response::Rows(
                    rows.into_iter().skip(offset).take(limit).collect(),
                ))
            }
            StatementKind::Count => {
                let count = tables.get(&table).map(|t| t.len()).unwrap_or(0);
                Ok(Response::Rows(vec![json!({ "count": count })]))
            }
            StatementKind::Delete => {
                let deleted = tables.remove(&table).map(|t| t.len()).unwrap_or(0);
                Ok(Response::Rows(vec![json!({ "numRowsDeleted": deleted })]))
            }
            StatementKind::Native => Err(ClientError::Request(
                "native statements are not supported".to_string(),
            )),
        }
    }
}

/// Order used for sorting: missing/null, booleans, numbers, strings, other
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(_) => 4,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[async_trait]
impl NosqlHandle for MemoryHandle {
    async fn execute(&self, request: Request) -> Result<Response, ClientError> {
        if self.is_closed() {
            return Err(ClientError::Closed);
        }
        self.authorize()?;

        if let Ok(mut recorded) = self.recorded.lock() {
            recorded.push(request.clone());
        }

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if let Request::Prepare { statement, .. } = request {
            return self.prepare(statement);
        }

        let mut tables = self
            .tables
            .lock()
            .map_err(|_| ClientError::Unavailable("simulator state is poisoned".to_string()))?;

        match request {
            Request::Get { table, key, .. } => {
                let key = Self::key_string(&key)?;
                Ok(Response::Row(
                    tables.get(&table).and_then(|t| t.get(&key)).cloned(),
                ))
            }
            Request::Put { table, key, row, .. } => {
                let key = Self::key_string(&key)?;
                tables.entry(table).or_default().insert(key, row);
                Ok(Response::Written)
            }
            Request::Delete { table, key, .. } => {
                let key = Self::key_string(&key)?;
                let removed = tables
                    .get_mut(&table)
                    .map(|t| t.remove(&key).is_some())
                    .unwrap_or(false);
                Ok(Response::Deleted(removed))
            }
            Request::Query { prepared, .. } => Self::query(&mut tables, &prepared),
            Request::Prepare { .. } => Err(ClientError::Request(
                "prepare handled above".to_string(),
            )),
        }
    }

    async fn close(&self) -> Result<(), ClientError> {
        if !self.closed.swap(true, AtomicOrdering::SeqCst) {
            self.close_count.fetch_add(1, AtomicOrdering::SeqCst);
            self.auth.close();
        }
        Ok(())
    }
}

/// Connector producing [`MemoryHandle`]s
#[derive(Debug, Default)]
pub struct MemoryConnector {
    latency: Option<Duration>,
    connect_delay: Option<Duration>,
    connects: AtomicUsize,
    last_handle: Mutex<Option<Arc<MemoryHandle>>>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request latency applied to every handle this connector builds
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Delay before a connection completes
    pub fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = Some(delay);
        self
    }

    /// How many handles have been built
    pub fn connect_count(&self) -> usize {
        self.connects.load(AtomicOrdering::SeqCst)
    }

    /// The most recently built handle
    pub fn handle(&self) -> Option<Arc<MemoryHandle>> {
        self.last_handle.lock().ok().and_then(|h| h.clone())
    }
}

#[async_trait]
impl HandleConnector for MemoryConnector {
    async fn connect(
        &self,
        config: &HandleConfig,
        auth: Arc<dyn AuthorizationProvider>,
    ) -> Result<Arc<dyn NosqlHandle>, ClientError> {
        if let Some(delay) = self.connect_delay {
            tokio::time::sleep(delay).await;
        }
        self.connects.fetch_add(1, AtomicOrdering::SeqCst);

        let mut handle = MemoryHandle::new(auth, config.user_agent.clone().unwrap_or_default());
        if let Some(latency) = self.latency {
            handle = handle.with_latency(latency);
        }
        let handle = Arc::new(handle);

        if let Ok(mut last) = self.last_handle.lock() {
            *last = Some(Arc::clone(&handle));
        }
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{SimulatedAuthProvider, StaticTokenProvider};
    use crate::validation::ValidatedTableName;
    use config::{Consistency, Durability};

    fn handle() -> MemoryHandle {
        MemoryHandle::new(Arc::new(SimulatedAuthProvider), "test-agent")
    }

    fn put(table: &str, id: i64, name: &str) -> Request {
        Request::Put {
            table: table.to_string(),
            key: json!({ "id": id }),
            row: json!({ "id": id, "name": name }),
            durability: Durability::CommitNoSync,
            timeout: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let handle = handle();
        assert_eq!(handle.execute(put("users", 1, "ann")).await.unwrap(), Response::Written);

        let get = Request::Get {
            table: "users".to_string(),
            key: json!({ "id": 1 }),
            consistency: Consistency::Eventual,
            timeout: Duration::from_secs(1),
        };
        match handle.execute(get.clone()).await.unwrap() {
            Response::Row(Some(row)) => assert_eq!(row["name"], "ann"),
            other => panic!("unexpected {:?}", other),
        }

        let delete = Request::Delete {
            table: "users".to_string(),
            key: json!({ "id": 1 }),
            durability: Durability::CommitSync,
            timeout: Duration::from_secs(1),
        };
        assert_eq!(handle.execute(delete.clone()).await.unwrap(), Response::Deleted(true));
        assert_eq!(handle.execute(delete).await.unwrap(), Response::Deleted(false));
        assert_eq!(handle.execute(get).await.unwrap(), Response::Row(None));
    }

    #[tokio::test]
    async fn test_sorted_query() {
        let handle = handle();
        for (id, name) in [(1, "cy"), (2, "al"), (3, "bo")] {
            handle.execute(put("users", id, name)).await.unwrap();
        }

        let table = ValidatedTableName::new("users").unwrap();
        let statement = Statement::select_all(&table)
            .order_by(&crate::query_builder::Sort::asc("name"))
            .unwrap()
            .limit(2);
        let prepared = match handle
            .execute(Request::Prepare {
                statement,
                timeout: Duration::from_secs(1),
            })
            .await
            .unwrap()
        {
            Response::Prepared(p) => p,
            other => panic!("unexpected {:?}", other),
        };

        let rows = handle
            .execute(Request::Query {
                prepared,
                consistency: Consistency::Absolute,
                durability: Durability::CommitNoSync,
                timeout: Duration::from_secs(1),
            })
            .await
            .unwrap();
        match rows {
            Response::Rows(rows) => {
                let names: Vec<_> = rows.iter().map(|r| r["name"].as_str().unwrap()).collect();
                assert_eq!(names, vec!["al", "bo"]);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(handle.prepare_count(), 1);
    }

    #[tokio::test]
    async fn test_native_statements_are_rejected() {
        let result = handle()
            .execute(Request::Prepare {
                statement: Statement::native("SELECT 1").unwrap(),
                timeout: Duration::from_secs(1),
            })
            .await;
        assert!(matches!(result, Err(ClientError::Request(_))));
    }

    #[tokio::test]
    async fn test_bad_token_is_unauthorized() {
        let handle = MemoryHandle::new(Arc::new(StaticTokenProvider::new("")), "agent");
        let result = handle.execute(put("users", 1, "ann")).await;
        assert!(matches!(result, Err(ClientError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let handle = handle();
        handle.close().await.unwrap();
        handle.close().await.unwrap();

        assert_eq!(handle.close_count(), 1);
        assert_eq!(
            handle.execute(put("users", 1, "ann")).await.unwrap_err(),
            ClientError::Closed
        );
    }

    #[test]
    fn test_value_ordering() {
        assert_eq!(compare_values(None, Some(&json!(1))), Ordering::Less);
        assert_eq!(compare_values(Some(&json!(2)), Some(&json!(10))), Ordering::Less);
        assert_eq!(compare_values(Some(&json!("b")), Some(&json!("a"))), Ordering::Greater);
        assert_eq!(compare_values(Some(&json!(1)), Some(&json!("1"))), Ordering::Less);
    }
}
