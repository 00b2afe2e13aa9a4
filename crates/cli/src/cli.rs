use clap::{ArgGroup, Parser, ValueEnum};
use query_engine::OutputFormat;
use std::path::PathBuf;
use std::time::Duration;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FormatArg {
    Table,
    Csv,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Table => OutputFormat::Table,
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "logq",
    version,
    about = "Run CloudWatch Logs Insights queries and save the results"
)]
#[command(group(
    ArgGroup::new("query_source")
        .required(true)
        .args(["query", "query_file"])
))]
pub(crate) struct Args {
    /// Logs Insights query text.
    #[arg(short, long)]
    pub(crate) query: Option<String>,
    /// Read the query text from a file.
    #[arg(long, value_name = "PATH")]
    pub(crate) query_file: Option<PathBuf>,
    /// Comma-separated log group names; `*` expands against existing groups.
    #[arg(short = 'g', long, value_name = "GROUPS")]
    pub(crate) log_groups: String,
    /// ISO 8601, Unix ms, relative (1h, 2d) or named (last-hour, today).
    #[arg(short, long)]
    pub(crate) start_time: String,
    #[arg(short, long)]
    pub(crate) end_time: Option<String>,
    /// Destination file; `-` writes to stdout.
    #[arg(short, long, value_name = "PATH")]
    pub(crate) output_file: Option<PathBuf>,
    #[arg(short, long, value_enum)]
    pub(crate) format: Option<FormatArg>,
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=10_000))]
    pub(crate) limit: Option<u32>,
    /// Drop @-prefixed metadata fields from the output.
    #[arg(long)]
    pub(crate) exclude_metadata: bool,
    #[arg(long)]
    pub(crate) profile: Option<String>,
    #[arg(long)]
    pub(crate) region: Option<String>,
    /// How often to print progress while waiting (`45`, `2m`).
    #[arg(long, value_parser = parse_interval)]
    pub(crate) update_interval: Option<Duration>,
    #[arg(long, env = "LOGQ_CONFIG")]
    pub(crate) config: Option<PathBuf>,
    #[arg(long, value_name = "DIR")]
    pub(crate) log_dir: Option<PathBuf>,
}

/// Bare integers are seconds; anything else goes through humantime.
pub(crate) fn parse_interval(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    let interval = match raw.parse::<u64>() {
        Ok(seconds) => Duration::from_secs(seconds),
        Err(_) => humantime::parse_duration(raw).map_err(|err| err.to_string())?,
    };
    if interval.is_zero() {
        return Err("interval must be greater than zero".to_string());
    }
    Ok(interval)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Result<Args, clap::Error> {
        let mut argv = vec!["logq", "-g", "/aws/lambda/api", "-s", "last-hour"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv)
    }

    #[test]
    fn query_or_query_file_is_required() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["-q", "fields @message"]).is_ok());
        assert!(parse(&["--query-file", "q.txt"]).is_ok());
        assert!(parse(&["-q", "fields @message", "--query-file", "q.txt"]).is_err());
    }

    #[test]
    fn limit_must_stay_in_range() {
        assert!(parse(&["-q", "x", "--limit", "0"]).is_err());
        assert!(parse(&["-q", "x", "--limit", "10001"]).is_err());
        let args = parse(&["-q", "x", "--limit", "10000"]).unwrap();
        assert_eq!(args.limit, Some(10_000));
    }

    #[test]
    fn format_is_parsed_as_value_enum() {
        let args = parse(&["-q", "x", "-f", "csv"]).unwrap();
        assert_eq!(args.format.map(OutputFormat::from), Some(OutputFormat::Csv));
        assert!(parse(&["-q", "x", "-f", "xml"]).is_err());
    }

    #[test]
    fn update_interval_accepts_seconds_and_humantime() {
        assert_eq!(parse_interval("45"), Ok(Duration::from_secs(45)));
        assert_eq!(parse_interval("2m"), Ok(Duration::from_secs(120)));
        assert!(parse_interval("0").is_err());
        assert!(parse_interval("soon").is_err());
    }

    #[test]
    fn defaults_leave_optional_flags_unset() {
        let args = parse(&["-q", "fields @message"]).unwrap();
        assert_eq!(args.end_time, None);
        assert_eq!(args.format, None);
        assert!(!args.exclude_metadata);
        assert_eq!(args.update_interval, None);
    }
}
