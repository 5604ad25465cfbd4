use super::{
    ExecutionId, ExecutionStatus, QueryExecutor, QueryRequest, QueryService, truncate_sql_bytes,
};
use crate::config::ClientConfig;
use crate::error::{CosmosError, CosmosResult};
use crate::record::ResultSet;
use std::time::Duration;
use tokio::time::Instant;

/// A [`QueryExecutor`] that drives a [`QueryService`] to completion.
///
/// Starts the query, polls its status every `poll_interval` until it
/// succeeds, fails, is cancelled or exceeds `timeout`, then pages out the
/// results.
#[derive(Debug, Clone)]
pub struct PollingExecutor<S> {
    service: S,
    region: String,
    timeout: Option<Duration>,
    poll_interval: Duration,
    max_sql_log_length: Option<usize>,
}

impl<S: QueryService> PollingExecutor<S> {
    /// Wrap a service using the default timeout and poll interval.
    pub fn new(service: S) -> Self {
        Self::with_config(service, &ClientConfig::default())
    }

    /// Wrap a service using the region and timing from `config`.
    pub fn with_config(service: S, config: &ClientConfig) -> Self {
        Self {
            service,
            region: config.region.clone(),
            timeout: config.timeout,
            poll_interval: config.poll_interval,
            max_sql_log_length: config.max_sql_log_length,
        }
    }

    /// Set the region sent with each request.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Set the polling timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Poll until the query settles, however long it takes.
    pub fn no_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Set the delay between status polls.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn into_inner(self) -> S {
        self.service
    }

    async fn run(&self, dataset: &str, sql: &str) -> CosmosResult<ResultSet> {
        let request = QueryRequest {
            region: self.region.clone(),
            dataset: dataset.to_string(),
            sql: sql.to_string(),
        };

        let id = self.service.start_query(&request).await?;
        tracing::debug!(
            target: "cosmos_genesis.sql",
            region = %self.region,
            dataset,
            execution_id = %id,
            sql = self.log_sql(sql),
            "query started"
        );

        self.wait_for(&id).await?;
        self.collect(&id).await
    }

    async fn wait_for(&self, id: &ExecutionId) -> CosmosResult<()> {
        let started = Instant::now();
        let mut last: Option<ExecutionStatus> = None;

        loop {
            let status = self.service.query_status(id).await?;
            if last.as_ref() != Some(&status) {
                tracing::debug!(
                    target: "cosmos_genesis.sql",
                    execution_id = %id,
                    status = ?status,
                    "query state changed"
                );
            }

            match &status {
                ExecutionStatus::Succeeded => return Ok(()),
                ExecutionStatus::Failed(reason) => {
                    tracing::warn!(target: "cosmos_genesis.sql", execution_id = %id, reason = %reason, "query failed");
                    return Err(CosmosError::query_failed(reason.clone()));
                }
                ExecutionStatus::Cancelled(reason) => {
                    tracing::warn!(target: "cosmos_genesis.sql", execution_id = %id, reason = %reason, "query cancelled");
                    return Err(CosmosError::query_failed(format!("cancelled: {reason}")));
                }
                ExecutionStatus::Queued | ExecutionStatus::Running => {}
            }

            if let Some(timeout) = self.timeout {
                if started.elapsed() >= timeout {
                    tracing::warn!(target: "cosmos_genesis.sql", execution_id = %id, ?timeout, "query timed out");
                    return Err(CosmosError::Timeout(timeout));
                }
            }

            last = Some(status);
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn collect(&self, id: &ExecutionId) -> CosmosResult<ResultSet> {
        let mut columns: Option<Vec<String>> = None;
        let mut rows = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let page = self.service.fetch_page(id, token.as_deref()).await?;
            let mut page_rows = page.rows.into_iter();

            if columns.is_none() {
                let Some(header) = page_rows.next() else {
                    // No header means no rows at all.
                    return Ok(ResultSet::default());
                };
                columns = Some(header_names(header));
            }
            rows.extend(page_rows);

            match page.next_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        Ok(ResultSet::new(columns.unwrap_or_default(), rows))
    }

    fn log_sql<'a>(&self, sql: &'a str) -> &'a str {
        match self.max_sql_log_length {
            Some(max) => truncate_sql_bytes(sql, max),
            None => sql,
        }
    }
}

/// Header cells that are NULL or blank fall back to `col<i>`.
fn header_names(header: Vec<Option<String>>) -> Vec<String> {
    header
        .into_iter()
        .enumerate()
        .map(|(i, name)| match name {
            Some(name) if !name.trim().is_empty() => name,
            _ => format!("col{i}"),
        })
        .collect()
}

impl<S: QueryService> QueryExecutor for PollingExecutor<S> {
    fn execute(
        &self,
        dataset: &str,
        sql: &str,
    ) -> impl std::future::Future<Output = CosmosResult<ResultSet>> + Send {
        self.run(dataset, sql)
    }
}
