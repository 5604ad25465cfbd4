//! High-level client for the Cosmos Genesis dataset service.

use crate::config::ClientConfig;
use crate::error::{CosmosError, CosmosResult};
use crate::executor::{QueryExecutor, truncate_sql_bytes};
use crate::query::QueryBuilder;
use crate::record::{Record, ResultSet};
use crate::scope::GalaxyScope;
use serde::Serialize;
use std::time::Instant;

/// Per-galaxy row from [`CosmosClient::list_galaxies`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalaxySummary {
    pub galaxy_id: String,
    pub system_count: u64,
}

/// Client that runs queries through any [`QueryExecutor`].
///
/// Queries run against `config.database`. Galaxy-scoped helpers restrict
/// them to one galaxy (and optionally one universe time) before execution.
///
/// ```ignore
/// let client = CosmosClient::new(executor, ClientConfig::from_env()?);
/// let stars = client
///     .query_galaxy("spiral-sm-2arm-001", "SELECT * FROM star WHERE stellar_mass_msun > 10 LIMIT 100", 0)
///     .await?;
/// ```
pub struct CosmosClient<E> {
    executor: E,
    config: ClientConfig,
}

impl<E: QueryExecutor> CosmosClient<E> {
    pub fn new(executor: E, config: ClientConfig) -> Self {
        Self { executor, config }
    }

    /// Client with default configuration.
    pub fn with_executor(executor: E) -> Self {
        Self::new(executor, ClientConfig::default())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn into_inner(self) -> E {
        self.executor
    }

    /// Run raw SQL against the configured database.
    pub async fn execute(&self, sql: &str) -> CosmosResult<ResultSet> {
        if sql.trim().is_empty() {
            return Err(CosmosError::invalid_argument("SQL must not be empty"));
        }

        let dataset = self.config.database.as_str();
        let start = Instant::now();
        let result = self.execute_with_timeout(dataset, sql).await;

        match &result {
            Ok(rs) => tracing::debug!(
                target: "cosmos_genesis.sql",
                dataset,
                sql = self.log_sql(sql),
                rows = rs.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "query complete"
            ),
            Err(err) => tracing::warn!(
                target: "cosmos_genesis.sql",
                dataset,
                sql = self.log_sql(sql),
                error = %err,
                "query error"
            ),
        }

        result
    }

    /// Build `qb` and run it.
    pub async fn execute_builder(&self, qb: &QueryBuilder) -> CosmosResult<ResultSet> {
        let sql = qb.build()?;
        self.execute(&sql).await
    }

    /// Run raw SQL restricted to one galaxy.
    ///
    /// `universe_time` is in Myr; `0` means all times.
    pub async fn query_galaxy(
        &self,
        galaxy_id: &str,
        sql: &str,
        universe_time: u64,
    ) -> CosmosResult<Vec<Record>> {
        let scope = GalaxyScope::new(galaxy_id)?.at_universe_time(universe_time);
        let scoped = scope.scope_sql(sql)?;
        Ok(self.execute(&scoped).await?.records())
    }

    /// Run a builder restricted to one galaxy.
    pub async fn query_galaxy_builder(
        &self,
        galaxy_id: &str,
        qb: &QueryBuilder,
        universe_time: u64,
    ) -> CosmosResult<Vec<Record>> {
        let scope = GalaxyScope::new(galaxy_id)?.at_universe_time(universe_time);
        let sql = scope.apply(qb).build()?;
        Ok(self.execute(&sql).await?.records())
    }

    /// All galaxies with their star system counts, ordered by id.
    pub async fn list_galaxies(&self) -> CosmosResult<Vec<GalaxySummary>> {
        let sql = self.list_galaxies_sql();
        let rs = self.execute(&sql).await?;
        rs.records()
            .iter()
            .map(|r| -> CosmosResult<GalaxySummary> {
                Ok(GalaxySummary {
                    galaxy_id: r.get_str("galaxy_id")?.to_string(),
                    system_count: r.try_get("system_count")?,
                })
            })
            .collect()
    }

    pub(crate) fn list_galaxies_sql(&self) -> String {
        format!(
            "SELECT galaxy_id, COUNT(*) AS system_count FROM {}.starsystem GROUP BY galaxy_id ORDER BY galaxy_id",
            self.config.database
        )
    }

    async fn execute_with_timeout(&self, dataset: &str, sql: &str) -> CosmosResult<ResultSet> {
        let future = self.executor.execute(dataset, sql);
        match self.config.timeout {
            Some(timeout) => {
                tokio::pin!(future);
                tokio::select! {
                    result = &mut future => result,
                    _ = tokio::time::sleep(timeout) => Err(CosmosError::Timeout(timeout)),
                }
            }
            None => future.await,
        }
    }

    fn log_sql<'a>(&self, sql: &'a str) -> &'a str {
        match self.config.max_sql_log_length {
            Some(max) => truncate_sql_bytes(sql, max),
            None => sql,
        }
    }
}
