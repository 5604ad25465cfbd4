use cosmos_genesis::SortDirection;
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_FILE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Query,
    Scope,
    Config,
}

#[derive(Debug, Clone)]
pub enum Command {
    Help(HelpTopic),
    Query(QueryArgs),
    Scope(ScopeArgs),
    Config(ConfigArgs),
}

/// Where the config file comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    pub path: PathBuf,
    /// Given via `--config`; a missing file is then an error.
    pub explicit: bool,
}

impl Default for ConfigSource {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_CONFIG_FILE),
            explicit: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryArgs {
    pub config: ConfigSource,
    pub select: Vec<String>,
    pub from: Option<String>,
    pub wheres: Vec<String>,
    pub order_by: Option<(String, SortDirection)>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub galaxy: Option<String>,
    pub universe_time: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct ScopeArgs {
    pub config: ConfigSource,
    pub galaxy: Option<String>,
    pub universe_time: Option<u64>,
    pub sql: String,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigArgs {
    pub config: ConfigSource,
}

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1);
    let Some(first) = it.next() else {
        return Ok(Command::Help(HelpTopic::Root));
    };

    match first.as_str() {
        "-h" | "--help" => Ok(Command::Help(HelpTopic::Root)),
        "query" => parse_query(it.map(|s| s.as_str())),
        "scope" => parse_scope(it.map(|s| s.as_str())),
        "config" => parse_config(it.map(|s| s.as_str())),
        _ => anyhow::bail!("unknown command: {first}"),
    }
}

/// Split `--flag=value` into (`--flag`, Some(value)).
fn split_flag(token: &str) -> (&str, Option<&str>) {
    match token.split_once('=') {
        Some((flag, value)) if flag.starts_with("--") => (flag, Some(value)),
        _ => (token, None),
    }
}

fn take_value<'a>(
    flag: &str,
    inline: Option<&'a str>,
    it: &mut impl Iterator<Item = &'a str>,
) -> anyhow::Result<&'a str> {
    match inline.or_else(|| it.next()) {
        Some(v) => Ok(v),
        None => anyhow::bail!("{flag} requires a value"),
    }
}

fn parse_int<T: std::str::FromStr>(flag: &str, v: &str) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    v.parse::<T>()
        .map_err(|e| anyhow::anyhow!("{flag}: invalid number '{v}': {e}"))
}

fn split_csv(v: &str) -> Vec<String> {
    v.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// `field`, `field:asc` or `field:desc`.
fn parse_order(v: &str) -> anyhow::Result<(String, SortDirection)> {
    match v.rsplit_once(':') {
        Some((field, dir)) => Ok((field.to_string(), dir.parse()?)),
        None => Ok((v.to_string(), SortDirection::Asc)),
    }
}

fn parse_query<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut args = QueryArgs::default();

    while let Some(token) = it.next() {
        let (flag, inline) = split_flag(token);
        match flag {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Query)),
            "--config" => {
                args.config = ConfigSource {
                    path: PathBuf::from(take_value(flag, inline, &mut it)?),
                    explicit: true,
                };
            }
            "--select" => {
                let fields = split_csv(take_value(flag, inline, &mut it)?);
                if fields.is_empty() {
                    anyhow::bail!("--select requires at least one field");
                }
                args.select.extend(fields);
            }
            "--from" => args.from = Some(take_value(flag, inline, &mut it)?.to_string()),
            "--where" => args.wheres.push(take_value(flag, inline, &mut it)?.to_string()),
            "--order-by" => args.order_by = Some(parse_order(take_value(flag, inline, &mut it)?)?),
            "--limit" => args.limit = Some(parse_int(flag, take_value(flag, inline, &mut it)?)?),
            "--offset" => args.offset = Some(parse_int(flag, take_value(flag, inline, &mut it)?)?),
            "--galaxy" => args.galaxy = Some(take_value(flag, inline, &mut it)?.to_string()),
            "--universe-time" => {
                args.universe_time = Some(parse_int(flag, take_value(flag, inline, &mut it)?)?)
            }
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    if args.from.is_none() {
        anyhow::bail!("--from is required");
    }

    Ok(Command::Query(args))
}

fn parse_scope<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut args = ScopeArgs::default();
    let mut sql_parts: Vec<&str> = Vec::new();

    while let Some(token) = it.next() {
        let (flag, inline) = split_flag(token);
        match flag {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Scope)),
            "--config" => {
                args.config = ConfigSource {
                    path: PathBuf::from(take_value(flag, inline, &mut it)?),
                    explicit: true,
                };
            }
            "--galaxy" => args.galaxy = Some(take_value(flag, inline, &mut it)?.to_string()),
            "--universe-time" => {
                args.universe_time = Some(parse_int(flag, take_value(flag, inline, &mut it)?)?)
            }
            other if other.starts_with("--") => anyhow::bail!("unknown argument: {other}"),
            _ => sql_parts.push(token),
        }
    }

    if sql_parts.is_empty() {
        anyhow::bail!("missing SQL to scope");
    }
    args.sql = sql_parts.join(" ");

    Ok(Command::Scope(args))
}

fn parse_config<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut args = ConfigArgs::default();

    while let Some(token) = it.next() {
        let (flag, inline) = split_flag(token);
        match flag {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Config)),
            "--config" => {
                args.config = ConfigSource {
                    path: PathBuf::from(take_value(flag, inline, &mut it)?),
                    explicit: true,
                };
            }
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    Ok(Command::Config(args))
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
cosmos - query tooling for the Cosmos Genesis dataset service

USAGE:
  cosmos <COMMAND> [OPTIONS]

COMMANDS:
  query         Render a SELECT statement from flags
  scope         Restrict hand-written SQL to one galaxy
  config        Show the effective client configuration

Run `cosmos <command> --help` for more."
            );
        }
        HelpTopic::Query => {
            println!(
                "\
USAGE:
  cosmos query --from <TABLE> [OPTIONS]

OPTIONS:
  --config <FILE>          Config file path (default: cosmos.toml)
  --select <CSV>           Fields to select (repeatable; default: *)
  --from <TABLE>           Table to query
  --where <COND>           Predicate, AND-combined (repeatable)
  --order-by <F[:DIR]>     Sort field, DIR is asc or desc (default: asc)
  --limit <N>              Maximum rows (default: [defaults].limit)
  --offset <N>             Rows to skip
  --galaxy <ID>            Restrict to one galaxy (default: [defaults].galaxy)
  --universe-time <MYR>    Restrict to one universe time (requires a galaxy)
  -h, --help               Print help"
            );
        }
        HelpTopic::Scope => {
            println!(
                "\
USAGE:
  cosmos scope --galaxy <ID> [OPTIONS] <SQL>...

OPTIONS:
  --config <FILE>          Config file path (default: cosmos.toml)
  --galaxy <ID>            Galaxy to restrict to (default: [defaults].galaxy)
  --universe-time <MYR>    Restrict to one universe time
  -h, --help               Print help"
            );
        }
        HelpTopic::Config => {
            println!(
                "\
USAGE:
  cosmos config [OPTIONS]

OPTIONS:
  --config <FILE>          Config file path (default: cosmos.toml)
  -h, --help               Print help"
            );
        }
    }
}
