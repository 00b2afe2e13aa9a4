use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

pub(crate) const LOG_FILE_NAME: &str = "logq.log";

/// Stderr logging filtered by `RUST_LOG`, else `level`. With `log_dir`, a
/// daily rolling JSON file is written as well; keep the returned guard alive
/// until exit so buffered lines are flushed.
pub(crate) fn init_tracing(level: &str, log_dir: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .map_err(|err| anyhow::anyhow!("invalid log level {level:?}: {err}"))?,
    };
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false);
    let registry = tracing_subscriber::registry().with(filter).with(stderr_layer);

    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_target(false)
                .json();
            registry.with(file_layer).init();
            Ok(Some(file_guard))
        }
        None => {
            registry.init();
            Ok(None)
        }
    }
}
