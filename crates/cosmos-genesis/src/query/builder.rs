//! SELECT query builder.

use crate::error::{CosmosError, CosmosResult};
use crate::query::order::{OrderBy, SortDirection};

/// Whether a builder has everything `build` needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    /// No table set yet.
    Incomplete,
    /// Table set; `build` will succeed.
    Ready,
}

/// Immutable SELECT query builder.
///
/// Every configuration call borrows the builder and returns a new one with a
/// single attribute changed, so a rejected call leaves the original intact.
///
/// ```ignore
/// use cosmos_genesis::QueryBuilder;
///
/// let sql = QueryBuilder::new()
///     .select(["system_id", "stellar_mass_msun"])?
///     .from_table("star")?
///     .r#where("stellar_mass_msun > 10")?
///     .limit(100)?
///     .build()?;
/// assert_eq!(
///     sql,
///     "SELECT system_id, stellar_mass_msun FROM star WHERE stellar_mass_msun > 10 LIMIT 100"
/// );
/// # Ok::<(), cosmos_genesis::CosmosError>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryBuilder {
    /// SELECT fields (empty renders `*`)
    fields: Vec<String>,
    /// FROM table
    table: Option<String>,
    /// WHERE predicates, AND-combined
    predicates: Vec<String>,
    /// ORDER BY
    order: Option<OrderBy>,
    /// LIMIT
    limit: Option<u64>,
    /// OFFSET
    offset: Option<u64>,
}

impl QueryBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Configuration ====================

    /// Append SELECT fields.
    ///
    /// Calls are cumulative; duplicates are kept in order.
    pub fn select<I, S>(&self, fields: I) -> CosmosResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added = Vec::new();
        for field in fields {
            added.push(non_empty("select field", field.as_ref())?);
        }
        if added.is_empty() {
            return Err(CosmosError::invalid_argument(
                "select requires at least one field",
            ));
        }

        let mut next = self.clone();
        next.fields.extend(added);
        Ok(next)
    }

    /// Set the FROM table, replacing any previous one.
    pub fn from_table(&self, name: &str) -> CosmosResult<Self> {
        let table = non_empty("table name", name)?;
        let mut next = self.clone();
        next.table = Some(table);
        Ok(next)
    }

    /// Append a WHERE predicate.
    ///
    /// The condition is taken verbatim; only emptiness is checked here.
    pub fn r#where(&self, condition: &str) -> CosmosResult<Self> {
        let condition = non_empty("where condition", condition)?;
        let mut next = self.clone();
        next.predicates.push(condition);
        Ok(next)
    }

    /// Set ORDER BY, replacing any previous ordering.
    pub fn order_by(&self, field: &str, direction: SortDirection) -> CosmosResult<Self> {
        let field = non_empty("order by field", field)?;
        let mut next = self.clone();
        next.order = Some(OrderBy { field, direction });
        Ok(next)
    }

    /// Set LIMIT. Negative counts are rejected.
    pub fn limit(&self, count: i64) -> CosmosResult<Self> {
        let count = non_negative("limit", count)?;
        let mut next = self.clone();
        next.limit = Some(count);
        Ok(next)
    }

    /// Set OFFSET. Negative counts are rejected.
    pub fn offset(&self, count: i64) -> CosmosResult<Self> {
        let count = non_negative("offset", count)?;
        let mut next = self.clone();
        next.offset = Some(count);
        Ok(next)
    }

    /// Prepend predicates ahead of the existing ones.
    pub(crate) fn with_leading_predicates(&self, leading: Vec<String>) -> Self {
        let mut next = self.clone();
        let mut predicates = leading;
        predicates.extend(next.predicates);
        next.predicates = predicates;
        next
    }

    // ==================== Accessors ====================

    pub fn state(&self) -> QueryState {
        if self.table.is_some() {
            QueryState::Ready
        } else {
            QueryState::Incomplete
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == QueryState::Ready
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn predicates(&self) -> &[String] {
        &self.predicates
    }

    pub fn order(&self) -> Option<&OrderBy> {
        self.order.as_ref()
    }

    pub fn limit_value(&self) -> Option<u64> {
        self.limit
    }

    pub fn offset_value(&self) -> Option<u64> {
        self.offset
    }

    // ==================== Build ====================

    /// Render the SQL string.
    ///
    /// Fails with [`CosmosError::IncompleteQuery`] when no table is set. The
    /// builder is left untouched, so repeated calls return the same string.
    pub fn build(&self) -> CosmosResult<String> {
        let Some(table) = self.table.as_deref() else {
            return Err(CosmosError::incomplete("FROM table required"));
        };

        let select_part = if self.fields.is_empty() {
            "*".to_string()
        } else {
            self.fields.join(", ")
        };

        let mut sql = format!("SELECT {} FROM {}", select_part, table);

        if !self.predicates.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.predicates.join(" AND "));
        }

        if let Some(order) = &self.order {
            sql.push_str(&format!(" ORDER BY {}", order));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {}", offset));
        }

        Ok(sql)
    }
}

fn non_empty(what: &str, value: &str) -> CosmosResult<String> {
    if value.trim().is_empty() {
        return Err(CosmosError::invalid_argument(format!(
            "{what} must not be empty"
        )));
    }
    Ok(value.to_string())
}

fn non_negative(what: &str, count: i64) -> CosmosResult<u64> {
    u64::try_from(count).map_err(|_| {
        CosmosError::invalid_argument(format!("{what} must be non-negative, got {count}"))
    })
}
