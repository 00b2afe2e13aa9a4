use protocol::{EpochMillis, QueryRequest, QueryStatus};
use query_engine::{ProgressUpdate, QueryObserver, QuerySpec, ResolvedResources};
use std::time::{Duration, UNIX_EPOCH};

const MAX_LISTED_GROUPS: usize = 5;

/// Prints the banner and progress lines to stderr so stdout carries only
/// results.
pub(crate) struct ConsoleObserver {
    start_text: String,
    end_text: String,
}

impl ConsoleObserver {
    pub(crate) fn new(spec: &QuerySpec) -> Self {
        Self {
            start_text: spec.start.clone(),
            end_text: spec.end.clone(),
        }
    }
}

impl QueryObserver for ConsoleObserver {
    fn resources_resolved(&mut self, resources: &ResolvedResources) {
        for line in resolved_lines(resources, &self.start_text, &self.end_text) {
            eprintln!("{line}");
        }
    }

    fn query_submitted(&mut self, query_id: &str, request: &QueryRequest) {
        eprintln!(
            "Resolved range: {} to {}",
            rfc3339(request.start),
            rfc3339(request.end)
        );
        eprintln!("Query ID: {query_id}");
        eprintln!("Waiting for query to complete...");
    }

    fn progress(&mut self, update: &ProgressUpdate) {
        for line in update.lines() {
            eprintln!("{line}");
        }
        if let Some(line) = failure_line(update.status) {
            eprintln!("{line}");
        }
    }
}

fn resolved_lines(resources: &ResolvedResources, start: &str, end: &str) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(warning) = resources.truncation_warning() {
        lines.push(format!("⚠ Warning: {warning}"));
    }
    lines.push(format!(
        "Executing query across {} log group(s)...",
        resources.names.len()
    ));
    lines.push(format!("Time range: {start} to {end}"));
    if resources.names.len() <= MAX_LISTED_GROUPS {
        lines.extend(resources.names.iter().map(|name| format!("  - {name}")));
    }
    lines
}

fn failure_line(status: QueryStatus) -> Option<&'static str> {
    match status {
        QueryStatus::Failed => Some("✗ Query failed"),
        QueryStatus::Cancelled => Some("✗ Query was cancelled"),
        QueryStatus::Timeout => Some("✗ Query timed out"),
        QueryStatus::Running | QueryStatus::Complete => None,
    }
}

fn rfc3339(millis: EpochMillis) -> String {
    let offset = Duration::from_millis(u64::try_from(millis).unwrap_or_default());
    humantime::format_rfc3339_millis(UNIX_EPOCH + offset).to_string()
}
