//! SQL-subset query construction.
//!
//! [`QueryBuilder`] assembles a single `SELECT` statement:
//!
//! ```text
//! SELECT <fields|*> FROM <table> [WHERE <c> AND <c> ...] [ORDER BY <f> ASC|DESC] [LIMIT <n>] [OFFSET <n>]
//! ```
//!
//! Field names and predicates are passed through verbatim. Semantic checks
//! (does the column exist, is the predicate valid SQL) happen server-side.
//!
//! # Usage
//!
//! ```ignore
//! use cosmos_genesis::query;
//!
//! let sql = query::select_from("star")?
//!     .select(["system_id", "spectral_type"])?
//!     .r#where("spectral_type = 'O'")?
//!     .limit(100)?
//!     .build()?;
//! ```

mod builder;
mod order;


pub use builder::{QueryBuilder, QueryState};
pub use order::{OrderBy, SortDirection};

use crate::error::CosmosResult;

/// Create a builder with the FROM table already set.
///
/// # Example
/// ```ignore
/// let qb = cosmos_genesis::query::select_from("planet")?;
/// assert!(qb.is_ready());
/// ```
pub fn select_from(table: &str) -> CosmosResult<QueryBuilder> {
    QueryBuilder::new().from_table(table)
}
