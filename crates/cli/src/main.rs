mod cli;
mod config;
mod console;
mod logging;
mod output;
#[cfg(test)]
mod test_utils;

use clap::Parser;
use cli::Args;
use cloudwatch_client::CloudWatchLogs;
use config::{load_config, Settings};
use console::ConsoleObserver;
use query_engine::{PollSettings, QueryError, QueryRunner};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report_failure(&err),
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let settings = Settings::resolve(&args, &config)?;
    let _log_guard = logging::init_tracing(&settings.log_level, settings.log_dir.as_deref())?;

    let client =
        CloudWatchLogs::connect(settings.profile.as_deref(), settings.region.as_deref()).await?;
    let runner = QueryRunner::new(client.clone(), client)
        .with_poll_settings(PollSettings::with_progress_interval(settings.update_interval));

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let mut observer = ConsoleObserver::new(&settings.spec);
    let outcome = runner.run(&settings.spec, &mut observer, &cancel).await?;

    let Some(rendered) = outcome.render(settings.format, settings.exclude_metadata)? else {
        eprintln!("No results returned from query");
        return Ok(());
    };
    let destination = output::destination(
        settings.output_file.as_deref(),
        settings.format,
        &outcome.query_id,
    );
    output::write_output(&destination, &rendered).await
}

fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received");
            cancel.cancel();
        }
    });
}

fn report_failure(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<QueryError>() {
        Some(QueryError::Interrupted { query_id }) => {
            eprintln!("\n✗ Query interrupted by user");
            if let Some(query_id) = query_id {
                eprintln!("  Query {query_id} was not cancelled and may still be running");
            }
            ExitCode::from(130)
        }
        Some(query_err) => {
            eprintln!("✗ Error: {query_err}");
            ExitCode::from(query_err.exit_code())
        }
        None => {
            eprintln!("✗ Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
