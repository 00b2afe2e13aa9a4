use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub mod config;

/// Milliseconds since the Unix epoch, UTC.
pub type EpochMillis = i64;

/// One result row: field name to rendered value. Rows are sparse, so two rows
/// of the same result set may carry different field names.
pub type ResultRow = BTreeMap<String, String>;

/// Everything the remote service needs to open one execution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryRequest {
    pub query: String,
    pub resources: Vec<String>,
    pub start: EpochMillis,
    pub end: EpochMillis,
    pub limit: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum QueryStatus {
    Running,
    Complete,
    Failed,
    Cancelled,
    Timeout,
}

impl QueryStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, QueryStatus::Running)
    }

    pub fn is_success(self) -> bool {
        matches!(self, QueryStatus::Complete)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QueryStatus::Running => "Running",
            QueryStatus::Complete => "Complete",
            QueryStatus::Failed => "Failed",
            QueryStatus::Cancelled => "Cancelled",
            QueryStatus::Timeout => "Timeout",
        }
    }
}

impl fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryStatistics {
    pub records_scanned: u64,
    pub records_matched: u64,
    pub bytes_scanned: u64,
}

/// A status snapshot of one remote execution. `rows` is only meaningful once
/// `status` is [`QueryStatus::Complete`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryResponse {
    pub status: QueryStatus,
    #[serde(default)]
    pub statistics: Option<QueryStatistics>,
    #[serde(default)]
    pub rows: Vec<ResultRow>,
}

impl QueryResponse {
    pub fn running(statistics: Option<QueryStatistics>) -> Self {
        Self {
            status: QueryStatus::Running,
            statistics,
            rows: Vec::new(),
        }
    }

    pub fn complete(statistics: Option<QueryStatistics>, rows: Vec<ResultRow>) -> Self {
        Self {
            status: QueryStatus::Complete,
            statistics,
            rows,
        }
    }

    pub fn terminated(status: QueryStatus, statistics: Option<QueryStatistics>) -> Self {
        Self {
            status,
            statistics,
            rows: Vec::new(),
        }
    }
}
