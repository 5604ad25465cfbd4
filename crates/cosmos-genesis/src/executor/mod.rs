//! The boundary between rendered SQL and the hosted dataset service.
//!
//! [`QueryExecutor`] is the whole contract a client needs: run `sql` in a
//! dataset, get rows back. How the bytes travel is up to the implementor.
//!
//! The hosted service itself is asynchronous: a query is started, polled until
//! it settles, then its results are paged out. [`QueryService`] models that
//! protocol and [`PollingExecutor`] turns any `QueryService` into a
//! `QueryExecutor`.

mod polling;

pub use polling::PollingExecutor;

use crate::error::CosmosResult;
use crate::record::ResultSet;
use std::fmt;

/// Runs a query against a dataset and returns its rows.
pub trait QueryExecutor: Send + Sync {
    /// Execute `sql` in `dataset`.
    fn execute(
        &self,
        dataset: &str,
        sql: &str,
    ) -> impl std::future::Future<Output = CosmosResult<ResultSet>> + Send;
}

impl<E: QueryExecutor> QueryExecutor for &E {
    fn execute(
        &self,
        dataset: &str,
        sql: &str,
    ) -> impl std::future::Future<Output = CosmosResult<ResultSet>> + Send {
        (**self).execute(dataset, sql)
    }
}

/// A query submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    /// Service region the query should run in.
    pub region: String,
    pub dataset: String,
    pub sql: String,
}

/// Service-assigned handle for a running query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExecutionId(pub String);

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of a submitted query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    Queued,
    Running,
    Succeeded,
    /// Failed, with the service's reason.
    Failed(String),
    /// Cancelled, with the service's reason.
    Cancelled(String),
}

impl ExecutionStatus {
    /// Whether the query has stopped changing state.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ExecutionStatus::Queued | ExecutionStatus::Running)
    }
}

/// One page of raw result rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultPage {
    pub rows: Vec<Vec<Option<String>>>,
    /// Token for the next page; `None` on the last page.
    pub next_token: Option<String>,
}

/// Start/poll/fetch protocol of the hosted query service.
pub trait QueryService: Send + Sync {
    /// Submit a query.
    fn start_query(
        &self,
        request: &QueryRequest,
    ) -> impl std::future::Future<Output = CosmosResult<ExecutionId>> + Send;

    /// Current state of a submitted query.
    fn query_status(
        &self,
        id: &ExecutionId,
    ) -> impl std::future::Future<Output = CosmosResult<ExecutionStatus>> + Send;

    /// Fetch one page of results. `next_token` is `None` for the first page.
    ///
    /// The first row of the first page is the column header.
    fn fetch_page(
        &self,
        id: &ExecutionId,
        next_token: Option<&str>,
    ) -> impl std::future::Future<Output = CosmosResult<ResultPage>> + Send;
}

/// Truncate to at most `max_bytes` on a char boundary.
pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
