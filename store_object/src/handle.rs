//! Driver boundary
//!
//! The store's wire protocol lives behind [`NosqlHandle`]. Repositories only
//! build [`Request`] values and interpret [`Response`] values; a
//! [`HandleConnector`] turns handle settings into a live handle.

use crate::auth::AuthorizationProvider;
use crate::errors::ClientError;
use crate::query_builder::Statement;
use async_trait::async_trait;
use config::{Consistency, Durability, HandleConfig};
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

/// Compiled form of a statement, as returned by the driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedStatement {
    pub statement: Statement,
    /// Driver-assigned identifier of the compiled plan
    pub plan_id: u64,
}

impl PreparedStatement {
    pub fn new(statement: Statement, plan_id: u64) -> Self {
        Self { statement, plan_id }
    }

    pub fn text(&self) -> String {
        self.statement.text()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Get {
        table: String,
        key: Value,
        consistency: Consistency,
        timeout: Duration,
    },
    Put {
        table: String,
        key: Value,
        row: Value,
        durability: Durability,
        timeout: Duration,
    },
    Delete {
        table: String,
        key: Value,
        durability: Durability,
        timeout: Duration,
    },
    Prepare {
        statement: Statement,
        timeout: Duration,
    },
    Query {
        prepared: PreparedStatement,
        consistency: Consistency,
        durability: Durability,
        timeout: Duration,
    },
}

impl Request {
    pub fn timeout(&self) -> Duration {
        match self {
            Request::Get { timeout, .. }
            | Request::Put { timeout, .. }
            | Request::Delete { timeout, .. }
            | Request::Prepare { timeout, .. }
            | Request::Query { timeout, .. } => *timeout,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Request::Get { .. } => "get",
            Request::Put { .. } => "put",
            Request::Delete { .. } => "delete",
            Request::Prepare { .. } => "prepare",
            Request::Query { .. } => "query",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Row(Option<Value>),
    Written,
    Deleted(bool),
    Prepared(PreparedStatement),
    Rows(Vec<Value>),
}

impl Response {
    pub fn kind(&self) -> &'static str {
        match self {
            Response::Row(_) => "row",
            Response::Written => "written",
            Response::Deleted(_) => "deleted",
            Response::Prepared(_) => "prepared",
            Response::Rows(_) => "rows",
        }
    }
}

/// Shared connection to the store
///
/// Implementations must be safe to call from many tasks at once and must
/// tolerate `close` being called more than once.
#[async_trait]
pub trait NosqlHandle: Send + Sync + Debug {
    async fn execute(&self, request: Request) -> Result<Response, ClientError>;

    async fn close(&self) -> Result<(), ClientError>;
}

/// Builds a handle from validated settings
///
/// The returned handle owns `auth` and closes it from its own `close`.
#[async_trait]
pub trait HandleConnector: Send + Sync {
    async fn connect(
        &self,
        config: &HandleConfig,
        auth: Arc<dyn AuthorizationProvider>,
    ) -> Result<Arc<dyn NosqlHandle>, ClientError>;
}
