use anyhow::Context;
pub(crate) use protocol::config::LogqConfig;
use query_engine::{OutputFormat, QuerySpec};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::{parse_interval, Args};

pub(crate) const DEFAULT_CONFIG_FILE: &str = "logq.toml";
const DEFAULT_END_TIME: &str = "now";
const DEFAULT_LIMIT: u32 = 10_000;
const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(30);
const DEFAULT_LOG_LEVEL: &str = "warn";

/// Effective settings for one invocation: flags over config over defaults.
#[derive(Debug)]
pub(crate) struct Settings {
    pub(crate) spec: QuerySpec,
    pub(crate) format: OutputFormat,
    pub(crate) exclude_metadata: bool,
    pub(crate) update_interval: Duration,
    pub(crate) output_file: Option<PathBuf>,
    pub(crate) profile: Option<String>,
    pub(crate) region: Option<String>,
    pub(crate) log_level: String,
    pub(crate) log_dir: Option<PathBuf>,
}

impl Settings {
    pub(crate) fn resolve(args: &Args, config: &LogqConfig) -> anyhow::Result<Self> {
        let query = match (&args.query, &args.query_file) {
            (Some(query), _) => query.trim().to_string(),
            (None, Some(path)) => read_query_file(path)?,
            (None, None) => anyhow::bail!("either --query or --query-file is required"),
        };
        if query.is_empty() {
            anyhow::bail!("query text is empty");
        }

        let defaults = &config.defaults;
        let format = match args.format {
            Some(format) => format.into(),
            None => config_format(config)?.unwrap_or_default(),
        };
        let update_interval = match args.update_interval {
            Some(interval) => interval,
            None => config_interval(config)?.unwrap_or(DEFAULT_UPDATE_INTERVAL),
        };
        let end = args
            .end_time
            .clone()
            .or_else(|| defaults.end_time.clone())
            .unwrap_or_else(|| DEFAULT_END_TIME.to_string());

        Ok(Self {
            spec: QuerySpec {
                query,
                patterns: parse_log_groups(&args.log_groups),
                start: args.start_time.clone(),
                end,
                limit: args.limit.or(defaults.limit).unwrap_or(DEFAULT_LIMIT),
            },
            format,
            exclude_metadata: args.exclude_metadata || defaults.exclude_metadata.unwrap_or(false),
            update_interval,
            output_file: args.output_file.clone(),
            profile: args.profile.clone().or_else(|| config.aws.profile.clone()),
            region: args.region.clone().or_else(|| config.aws.region.clone()),
            log_level: config
                .logging
                .level
                .clone()
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_dir: args
                .log_dir
                .clone()
                .or_else(|| config.logging.dir.as_ref().map(PathBuf::from)),
        })
    }
}

/// Comma-separated names, trimmed, empty entries dropped.
pub(crate) fn parse_log_groups(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn read_query_file(path: &Path) -> anyhow::Result<String> {
    if !path.exists() {
        anyhow::bail!("Query file not found: {}", path.display());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read query file {}", path.display()))?;
    Ok(raw.trim().to_string())
}

fn config_format(config: &LogqConfig) -> anyhow::Result<Option<OutputFormat>> {
    config
        .defaults
        .format
        .as_deref()
        .map(|raw| {
            raw.parse::<OutputFormat>()
                .map_err(|err| anyhow::anyhow!("defaults.format: {err}"))
        })
        .transpose()
}

fn config_interval(config: &LogqConfig) -> anyhow::Result<Option<Duration>> {
    config
        .defaults
        .update_interval
        .as_deref()
        .map(|raw| parse_interval(raw).map_err(|err| anyhow::anyhow!("defaults.update_interval: {err}")))
        .transpose()
}

fn validate_config(config: &LogqConfig) -> anyhow::Result<()> {
    if let Some(limit) = config.defaults.limit {
        if !(1..=DEFAULT_LIMIT).contains(&limit) {
            anyhow::bail!("defaults.limit must be between 1 and {DEFAULT_LIMIT}, got {limit}");
        }
    }
    config_format(config)?;
    config_interval(config)?;
    if let Some(level) = config.logging.level.as_deref() {
        if level.trim().is_empty() {
            anyhow::bail!("logging.level must not be empty");
        }
    }
    Ok(())
}

/// `explicit` (from `--config` or `LOGQ_CONFIG`) must exist; the default
/// `logq.toml` is optional.
pub(crate) fn load_config(explicit: Option<&Path>) -> anyhow::Result<LogqConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !path.exists() {
                return Ok(LogqConfig::default());
            }
            path
        }
    };
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: LogqConfig = toml::from_str(&raw)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}
