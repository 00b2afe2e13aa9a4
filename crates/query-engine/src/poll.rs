use protocol::QueryResponse;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::QueryError;
use crate::progress::{ProgressUpdate, QueryObserver};
use crate::service::QueryService;

pub const DEFAULT_POLL_PERIOD: Duration = Duration::from_secs(2);
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Delay between status fetches.
    pub poll_period: Duration,
    /// Minimum gap between non-terminal progress reports.
    pub progress_interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            poll_period: DEFAULT_POLL_PERIOD,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl PollSettings {
    pub fn with_progress_interval(progress_interval: Duration) -> Self {
        Self {
            progress_interval,
            ..Self::default()
        }
    }
}

struct PollState {
    started: Instant,
    last_report: Instant,
}

/// Poll `query_id` until it reaches a terminal status.
///
/// Returns the final response only for `Complete`; `Failed`, `Cancelled`
/// and `Timeout` come back as [`QueryError::Terminated`]. Cancelling
/// `cancel` aborts the wait with [`QueryError::Interrupted`] but leaves the
/// remote execution running.
pub async fn await_completion<S, O>(
    service: &S,
    query_id: &str,
    settings: PollSettings,
    observer: &mut O,
    cancel: &CancellationToken,
) -> Result<QueryResponse, QueryError>
where
    S: QueryService + ?Sized,
    O: QueryObserver + ?Sized,
{
    let started = Instant::now();
    let mut state = PollState {
        started,
        last_report: started,
    };

    loop {
        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(interrupted(query_id)),
            fetched = service.get_status(query_id) => fetched,
        };
        let response = fetched.map_err(|err| QueryError::StatusFetch {
            query_id: query_id.to_string(),
            message: err.to_string(),
        })?;

        report(&mut state, &response, settings, observer);

        if response.status.is_terminal() {
            if response.status.is_success() {
                tracing::info!(
                    query_id = %query_id,
                    rows = response.rows.len(),
                    "query complete"
                );
                return Ok(response);
            }
            tracing::warn!(query_id = %query_id, status = %response.status, "query ended without results");
            return Err(QueryError::Terminated {
                query_id: query_id.to_string(),
                status: response.status,
            });
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(interrupted(query_id)),
            _ = tokio::time::sleep(settings.poll_period) => {}
        }
    }
}

fn report<O>(state: &mut PollState, response: &QueryResponse, settings: PollSettings, observer: &mut O)
where
    O: QueryObserver + ?Sized,
{
    let now = Instant::now();
    let due = now.duration_since(state.last_report) >= settings.progress_interval;
    if !due && !response.status.is_terminal() {
        return;
    }
    observer.progress(&ProgressUpdate {
        elapsed: now.duration_since(state.started),
        status: response.status,
        statistics: response.statistics,
    });
    state.last_report = now;
}

fn interrupted(query_id: &str) -> QueryError {
    tracing::warn!(query_id = %query_id, "wait for query interrupted");
    QueryError::Interrupted {
        query_id: Some(query_id.to_string()),
    }
}
