use cosmos_genesis::ClientConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "cosmos.toml";

/// Parsed `cosmos.toml`, plus where it came from.
#[derive(Debug, Clone, Default)]
pub struct ProjectConfig {
    /// `None` when no file was found and defaults are in use.
    pub config_path: Option<PathBuf>,
    pub file: ConfigFile,
}

impl ProjectConfig {
    /// Load `config_path`.
    ///
    /// A missing file is only an error when the path was given explicitly;
    /// otherwise defaults are used.
    pub fn load(config_path: &Path, explicit: bool) -> anyhow::Result<Self> {
        if !config_path.exists() {
            if explicit {
                anyhow::bail!("config file not found: {}", config_path.display());
            }
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(config_path).map_err(|e| {
            anyhow::anyhow!("failed to read config file {}: {e}", config_path.display())
        })?;

        let file = ConfigFile::parse(&raw).map_err(|e| {
            anyhow::anyhow!("failed to parse config file {}: {e:#}", config_path.display())
        })?;

        Ok(Self {
            config_path: Some(config_path.to_path_buf()),
            file,
        })
    }

    /// Defaults, then the file, then `COSMOS_*` environment variables.
    pub fn client_config(&self) -> anyhow::Result<ClientConfig> {
        let mut cfg = ClientConfig::default();
        let client = &self.file.client;

        if let Some(region) = &client.region {
            cfg = cfg.region(region)?;
        }
        if let Some(database) = &client.database {
            cfg = cfg.database(database)?;
        }
        match client.timeout_secs {
            Some(0) => cfg = cfg.no_timeout(),
            Some(secs) => cfg = cfg.timeout(Duration::from_secs(secs)),
            None => {}
        }
        if let Some(ms) = client.poll_interval_ms {
            cfg = cfg.poll_interval(Duration::from_millis(ms))?;
        }

        Ok(cfg.with_overrides(|key| std::env::var(key).ok())?)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub client: ClientSection,
    #[serde(default)]
    pub defaults: DefaultsSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientSection {
    pub region: Option<String>,
    pub database: Option<String>,
    pub timeout_secs: Option<u64>,
    pub poll_interval_ms: Option<u64>,
}

/// Values applied to `cosmos query` when the flag is absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultsSection {
    pub galaxy: Option<String>,
    pub universe_time: Option<u64>,
    pub limit: Option<i64>,
}

impl ConfigFile {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let mut file: ConfigFile = toml::from_str(raw)?;
        file.expand_env()?;
        Ok(file)
    }

    fn expand_env(&mut self) -> anyhow::Result<()> {
        for v in [
            &mut self.client.region,
            &mut self.client.database,
            &mut self.defaults.galaxy,
        ]
        .into_iter()
        .flatten()
        {
            *v = expand_env_vars(v)?;
        }
        Ok(())
    }
}

/// Replace `${VAR}` references with environment values.
fn expand_env_vars(input: &str) -> anyhow::Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                anyhow::bail!("unterminated env var reference: ${{{key}}}");
            }
            if key.is_empty() {
                anyhow::bail!("invalid env var reference: ${{}}");
            }

            let v = std::env::var(&key)
                .map_err(|_| anyhow::anyhow!("missing env var for config expansion: {key}"))?;
            out.push_str(&v);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}
