use protocol::{QueryRequest, QueryStatistics, QueryStatus};
use std::time::Duration;

use crate::resources::ResolvedResources;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub elapsed: Duration,
    pub status: QueryStatus,
    pub statistics: Option<QueryStatistics>,
}

impl ProgressUpdate {
    /// Human-readable status block, one entry per output line.
    pub fn lines(&self) -> Vec<String> {
        let elapsed = format_elapsed(self.elapsed);
        let mut lines = vec![format!("[{elapsed}] Status: {}", self.status)];
        if let Some(stats) = &self.statistics {
            if stats.bytes_scanned > 0 {
                lines.push(format!(
                    "  → Scanned: {} records ({})",
                    group_thousands(stats.records_scanned),
                    format_megabytes(stats.bytes_scanned)
                ));
            } else {
                lines.push(format!(
                    "  → Scanned: {} records",
                    group_thousands(stats.records_scanned)
                ));
            }
            lines.push(format!(
                "  → Matched: {} records",
                group_thousands(stats.records_matched)
            ));
        }
        if self.status.is_success() {
            lines.push(format!("✓ Query completed successfully in {elapsed}"));
        }
        lines
    }
}

/// Receives pipeline milestones. Only [`progress`](QueryObserver::progress)
/// is required.
pub trait QueryObserver: Send {
    fn resources_resolved(&mut self, _resources: &ResolvedResources) {}

    fn query_submitted(&mut self, _query_id: &str, _request: &QueryRequest) {}

    fn progress(&mut self, update: &ProgressUpdate);
}

/// Observer that discards everything.
pub struct SilentObserver;

impl QueryObserver for SilentObserver {
    fn progress(&mut self, _update: &ProgressUpdate) {}
}

/// `42s` below one minute, `3m 7s` from there on.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{secs}s")
    }
}

pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
}

pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
