#![allow(dead_code)]

use cosmos_genesis::{
    CosmosError, CosmosResult, ExecutionId, ExecutionStatus, QueryExecutor, QueryRequest,
    QueryService, ResultPage, ResultSet,
};
use std::collections::VecDeque;
use std::future::{Future, ready};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub fn cell(v: &str) -> Option<String> {
    Some(v.to_string())
}

pub fn row(cells: &[&str]) -> Vec<Option<String>> {
    cells.iter().map(|c| cell(c)).collect()
}

/// Query service that replays a fixed status script and serves fixed pages.
pub struct ScriptedService {
    statuses: Mutex<VecDeque<ExecutionStatus>>,
    /// Returned once the script runs out.
    settled: ExecutionStatus,
    pages: Vec<ResultPage>,
    pub requests: Mutex<Vec<QueryRequest>>,
    pub polls: AtomicUsize,
}

impl ScriptedService {
    pub fn new(statuses: Vec<ExecutionStatus>, settled: ExecutionStatus) -> Self {
        Self {
            statuses: Mutex::new(statuses.into()),
            settled,
            pages: Vec::new(),
            requests: Mutex::new(Vec::new()),
            polls: AtomicUsize::new(0),
        }
    }

    /// Serve `pages` in order; tokens are `page-<n>`.
    pub fn with_pages(mut self, pages: Vec<Vec<Vec<Option<String>>>>) -> Self {
        let count = pages.len();
        self.pages = pages
            .into_iter()
            .enumerate()
            .map(|(i, rows)| ResultPage {
                rows,
                next_token: (i + 1 < count).then(|| format!("page-{}", i + 1)),
            })
            .collect();
        self
    }

    pub fn last_request(&self) -> Option<QueryRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl QueryService for ScriptedService {
    fn start_query(
        &self,
        request: &QueryRequest,
    ) -> impl Future<Output = CosmosResult<ExecutionId>> + Send {
        self.requests.lock().unwrap().push(request.clone());
        ready(Ok(ExecutionId("exec-1".to_string())))
    }

    fn query_status(
        &self,
        _id: &ExecutionId,
    ) -> impl Future<Output = CosmosResult<ExecutionStatus>> + Send {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let next = self.statuses.lock().unwrap().pop_front();
        ready(Ok(next.unwrap_or_else(|| self.settled.clone())))
    }

    fn fetch_page(
        &self,
        _id: &ExecutionId,
        next_token: Option<&str>,
    ) -> impl Future<Output = CosmosResult<ResultPage>> + Send {
        let index = match next_token {
            None => Ok(0),
            Some(token) => token
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| CosmosError::Other(format!("bad token {token}"))),
        };
        let page = index.map(|i| self.pages.get(i).cloned().unwrap_or_default());
        ready(page)
    }
}

/// Executor that records every call and answers with a canned result.
pub struct RecordingExecutor {
    pub calls: Mutex<Vec<(String, String)>>,
    response: ResultSet,
    delay: Option<Duration>,
}

impl RecordingExecutor {
    pub fn new(response: ResultSet) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            response,
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn last_sql(&self) -> Option<String> {
        self.calls.lock().unwrap().last().map(|(_, sql)| sql.clone())
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl QueryExecutor for RecordingExecutor {
    fn execute(
        &self,
        dataset: &str,
        sql: &str,
    ) -> impl Future<Output = CosmosResult<ResultSet>> + Send {
        self.calls
            .lock()
            .unwrap()
            .push((dataset.to_string(), sql.to_string()));
        let response = self.response.clone();
        let delay = self.delay;
        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            Ok(response)
        }
    }
}
