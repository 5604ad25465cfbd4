use crate::cli::{QueryArgs, ScopeArgs};
use crate::config::ProjectConfig;
use cosmos_genesis::{GalaxyScope, QueryBuilder};

/// Render the SELECT described by `args`, filling gaps from `[defaults]`.
pub fn render_query(args: &QueryArgs, project: &ProjectConfig) -> anyhow::Result<String> {
    let defaults = &project.file.defaults;
    let Some(table) = args.from.as_deref() else {
        anyhow::bail!("--from is required");
    };

    let mut qb = QueryBuilder::new().from_table(table)?;
    if !args.select.is_empty() {
        qb = qb.select(&args.select)?;
    }
    for cond in &args.wheres {
        qb = qb.r#where(cond)?;
    }
    if let Some((field, direction)) = &args.order_by {
        qb = qb.order_by(field, *direction)?;
    }
    if let Some(limit) = args.limit.or(defaults.limit) {
        qb = qb.limit(limit)?;
    }
    if let Some(offset) = args.offset {
        qb = qb.offset(offset)?;
    }

    let galaxy = args.galaxy.as_deref().or(defaults.galaxy.as_deref());
    let universe_time = args.universe_time.or(defaults.universe_time);
    match galaxy {
        Some(galaxy) => {
            let scope = GalaxyScope::new(galaxy)?.at_universe_time(universe_time.unwrap_or(0));
            Ok(scope.apply(&qb).build()?)
        }
        None if args.universe_time.is_some() => {
            anyhow::bail!("--universe-time requires --galaxy")
        }
        None => Ok(qb.build()?),
    }
}

/// Rewrite `args.sql` to a single galaxy.
pub fn render_scope(args: &ScopeArgs, project: &ProjectConfig) -> anyhow::Result<String> {
    let defaults = &project.file.defaults;
    let Some(galaxy) = args.galaxy.as_deref().or(defaults.galaxy.as_deref()) else {
        anyhow::bail!("--galaxy is required (or set [defaults].galaxy)");
    };
    let universe_time = args.universe_time.or(defaults.universe_time).unwrap_or(0);

    let scope = GalaxyScope::new(galaxy)?.at_universe_time(universe_time);
    Ok(scope.scope_sql(&args.sql)?)
}
