use anyhow::Context;
use query_engine::OutputFormat;
use std::path::{Path, PathBuf};

const AUTO_FILE_PREFIX: &str = "cloudwatch_logs_results";
const AUTO_ID_CHARS: usize = 8;
const STDOUT_MARKER: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Destination {
    Stdout,
    File(PathBuf),
}

/// Tables go to stdout unless a file is named; CSV and JSON default to an
/// automatic file name derived from the query id.
pub(crate) fn destination(explicit: Option<&Path>, format: OutputFormat, query_id: &str) -> Destination {
    match explicit {
        Some(path) if path == Path::new(STDOUT_MARKER) => Destination::Stdout,
        Some(path) => Destination::File(path.to_path_buf()),
        None if format == OutputFormat::Table => Destination::Stdout,
        None => Destination::File(PathBuf::from(auto_file_name(query_id, format))),
    }
}

pub(crate) fn auto_file_name(query_id: &str, format: OutputFormat) -> String {
    let short_id: String = query_id.chars().take(AUTO_ID_CHARS).collect();
    format!("{AUTO_FILE_PREFIX}_{short_id}.{}", format.extension())
}

pub(crate) async fn write_output(destination: &Destination, rendered: &str) -> anyhow::Result<()> {
    match destination {
        Destination::Stdout => println!("{rendered}"),
        Destination::File(path) => {
            tokio::fs::write(path, format!("{rendered}\n"))
                .await
                .with_context(|| format!("failed to write results to {}", path.display()))?;
            tracing::info!(path = %path.display(), bytes = rendered.len(), "results written");
            eprintln!("✓ Results saved to: {}", path.display());
        }
    }
    Ok(())
}
