//! # cosmos-genesis
//!
//! Client library for the Cosmos Genesis universe simulation dataset service.
//!
//! ## Features
//!
//! - **Query builder**: compose `SELECT` statements from chained, validated calls
//! - **Galaxy scoping**: restrict builders or hand-written SQL to one galaxy and universe time
//! - **Transport-agnostic**: queries run through the [`QueryExecutor`] trait
//! - **Polling executor**: drive any start/poll/fetch [`QueryService`] with timeouts
//!
//! ## Query Builder
//!
//! ```ignore
//! use cosmos_genesis::{QueryBuilder, SortDirection};
//!
//! let sql = QueryBuilder::new()
//!     .select(["system_id", "stellar_mass_msun"])?
//!     .from_table("star")?
//!     .r#where("spectral_type = 'O'")?
//!     .order_by("stellar_mass_msun", SortDirection::Desc)?
//!     .limit(100)?
//!     .build()?;
//! ```
//!
//! ## Client
//!
//! ```ignore
//! use cosmos_genesis::{ClientConfig, CosmosClient, PollingExecutor};
//!
//! let config = ClientConfig::from_env()?;
//! let client = CosmosClient::new(PollingExecutor::with_config(service, &config), config);
//!
//! for galaxy in client.list_galaxies().await? {
//!     println!("{} {}", galaxy.galaxy_id, galaxy.system_count);
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod query;
pub mod record;
pub mod scope;

pub use client::{CosmosClient, GalaxySummary};
pub use config::ClientConfig;
pub use error::{CosmosError, CosmosResult};
pub use executor::{
    ExecutionId, ExecutionStatus, PollingExecutor, QueryExecutor, QueryRequest, QueryService,
    ResultPage,
};
pub use query::{OrderBy, QueryBuilder, QueryState, SortDirection, select_from};
pub use record::{Record, ResultSet};
pub use scope::GalaxyScope;
