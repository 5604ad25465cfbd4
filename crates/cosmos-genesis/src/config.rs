//! Client configuration.

use crate::error::{CosmosError, CosmosResult};
use std::time::Duration;

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_DATABASE: &str = "cosmological_production";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration for `CosmosClient` and `PollingExecutor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Service region. `PollingExecutor::with_config` sends it with every
    /// `QueryRequest`.
    pub region: String,
    /// Dataset (database) queries run against.
    pub database: String,
    /// Overall query timeout. `None` means wait indefinitely.
    pub timeout: Option<Duration>,
    /// Delay between status polls.
    pub poll_interval: Duration,
    /// Truncate logged SQL to this many bytes. `None` means no truncation.
    pub max_sql_log_length: Option<usize>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            timeout: Some(DEFAULT_TIMEOUT),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_sql_log_length: Some(200),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with `COSMOS_*` environment variables.
    ///
    /// - `COSMOS_REGION`
    /// - `COSMOS_DATABASE`
    /// - `COSMOS_TIMEOUT_SECS` (`0` disables the timeout)
    /// - `COSMOS_POLL_INTERVAL_MS`
    pub fn from_env() -> CosmosResult<Self> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Overlay values from an arbitrary key lookup (used by `from_env`).
    pub fn with_overrides<F>(mut self, lookup: F) -> CosmosResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(region) = lookup("COSMOS_REGION") {
            self = self.region(&region)?;
        }
        if let Some(database) = lookup("COSMOS_DATABASE") {
            self = self.database(&database)?;
        }
        if let Some(raw) = lookup("COSMOS_TIMEOUT_SECS") {
            let secs = parse_number("COSMOS_TIMEOUT_SECS", &raw)?;
            self.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(raw) = lookup("COSMOS_POLL_INTERVAL_MS") {
            let ms = parse_number("COSMOS_POLL_INTERVAL_MS", &raw)?;
            self = self.poll_interval(Duration::from_millis(ms))?;
        }
        Ok(self)
    }

    /// Set the region.
    pub fn region(mut self, region: &str) -> CosmosResult<Self> {
        if region.trim().is_empty() {
            return Err(CosmosError::config("region must not be empty"));
        }
        self.region = region.trim().to_string();
        Ok(self)
    }

    /// Set the dataset queries run against.
    pub fn database(mut self, database: &str) -> CosmosResult<Self> {
        if database.trim().is_empty() {
            return Err(CosmosError::config("database must not be empty"));
        }
        self.database = database.trim().to_string();
        Ok(self)
    }

    /// Set the overall query timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Disable the query timeout.
    pub fn no_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Set the status poll interval. Must be non-zero.
    pub fn poll_interval(mut self, interval: Duration) -> CosmosResult<Self> {
        if interval.is_zero() {
            return Err(CosmosError::config("poll interval must be non-zero"));
        }
        self.poll_interval = interval;
        Ok(self)
    }

    /// Set maximum SQL length to log.
    pub fn max_sql_log_length(mut self, len: usize) -> Self {
        self.max_sql_log_length = Some(len);
        self
    }

    /// Log SQL without truncation.
    pub fn no_sql_truncate(mut self) -> Self {
        self.max_sql_log_length = None;
        self
    }
}

fn parse_number(key: &str, raw: &str) -> CosmosResult<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| CosmosError::config(format!("{key}: invalid value '{raw}': {e}")))
}
