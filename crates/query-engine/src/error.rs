use protocol::{EpochMillis, QueryStatus};

use crate::time::describe_millis;

pub(crate) const SUPPORTED_TIME_FORMATS: &str =
    "ISO 8601, Unix ms, relative (1h, 2d), named (last-hour, now)";

/// Coarse classification of [`QueryError`], one per failure family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    TimeFormat,
    ResourceNotFound,
    QuerySyntax,
    RateLimit,
    Execution,
    Interrupted,
}

/// Every way a query pipeline can terminate early. None of these are retried.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error(
        "unable to parse time format: {input:?} (supported formats: {})",
        SUPPORTED_TIME_FORMATS
    )]
    TimeFormat { input: String },

    #[error("time {input:?} resolves before the Unix epoch ({millis})")]
    TimeBeforeEpoch { input: String, millis: EpochMillis },

    #[error("log group not found: {pattern} (verify it exists and you have access to it)")]
    ResourceNotFound { pattern: String },

    #[error("no log groups found matching pattern: {pattern}")]
    NoResourceMatch { pattern: String },

    #[error("no log groups given")]
    NoResources,

    #[error(
        "start time must be before end time (start: {}, end: {})",
        range_bound(.start),
        range_bound(.end)
    )]
    InvalidTimeRange {
        start: EpochMillis,
        end: EpochMillis,
    },

    #[error("invalid query syntax: {message}")]
    QuerySyntax { message: String },

    #[error("API rate limit exceeded, wait and try again: {message}")]
    RateLimited { message: String },

    #[error("query execution failed: {message}")]
    Submission { message: String },

    #[error("error fetching query results for {query_id}: {message}")]
    StatusFetch { query_id: String, message: String },

    #[error("{} (query id {query_id})", terminal_message(.status))]
    Terminated {
        query_id: String,
        status: QueryStatus,
    },

    #[error("error listing log groups for {pattern}: {message}")]
    Catalog { pattern: String, message: String },

    #[error("query interrupted by user{}", query_suffix(.query_id))]
    Interrupted { query_id: Option<String> },
}

impl QueryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QueryError::TimeFormat { .. } | QueryError::TimeBeforeEpoch { .. } => {
                ErrorKind::TimeFormat
            }
            QueryError::ResourceNotFound { .. }
            | QueryError::NoResourceMatch { .. }
            | QueryError::NoResources => ErrorKind::ResourceNotFound,
            QueryError::InvalidTimeRange { .. } | QueryError::QuerySyntax { .. } => {
                ErrorKind::QuerySyntax
            }
            QueryError::RateLimited { .. } => ErrorKind::RateLimit,
            QueryError::Submission { .. }
            | QueryError::StatusFetch { .. }
            | QueryError::Terminated { .. }
            | QueryError::Catalog { .. } => ErrorKind::Execution,
            QueryError::Interrupted { .. } => ErrorKind::Interrupted,
        }
    }

    /// Conventional process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        match self.kind() {
            ErrorKind::Interrupted => 130,
            _ => 1,
        }
    }
}

fn range_bound(millis: &EpochMillis) -> String {
    describe_millis(*millis)
}

fn terminal_message(status: &QueryStatus) -> &'static str {
    match status {
        QueryStatus::Failed => "query failed",
        QueryStatus::Cancelled => "query was cancelled",
        QueryStatus::Timeout => "query timed out",
        QueryStatus::Running | QueryStatus::Complete => "query ended unexpectedly",
    }
}

fn query_suffix(query_id: &Option<String>) -> String {
    match query_id {
        Some(id) => format!(" (query id {id})"),
        None => String::new(),
    }
}
