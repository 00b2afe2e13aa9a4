use chrono::Local;
use protocol::{EpochMillis, QueryRequest, QueryResponse, ResultRow};
use std::future::Future;
use tokio_util::sync::CancellationToken;

use crate::error::QueryError;
use crate::format::{format_rows, FormatError, OutputFormat};
use crate::poll::{await_completion, PollSettings};
use crate::progress::QueryObserver;
use crate::resources::{validate, ResolvedResources};
use crate::service::{QueryService, ResourceCatalog};
use crate::submit::submit;
use crate::time::resolve_at;

/// One query as the user phrased it: raw time expressions and resource
/// patterns, not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    pub query: String,
    pub patterns: Vec<String>,
    pub start: String,
    pub end: String,
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOutcome {
    pub query_id: String,
    pub resources: ResolvedResources,
    pub start: EpochMillis,
    pub end: EpochMillis,
    pub response: QueryResponse,
}

impl QueryOutcome {
    pub fn rows(&self) -> &[ResultRow] {
        &self.response.rows
    }

    pub fn render(
        &self,
        format: OutputFormat,
        exclude_metadata: bool,
    ) -> Result<Option<String>, FormatError> {
        format_rows(self.rows(), format, exclude_metadata)
    }
}

/// Drives a query from raw user input to its terminal response.
pub struct QueryRunner<S, C> {
    service: S,
    catalog: C,
    settings: PollSettings,
}

impl<S, C> QueryRunner<S, C>
where
    S: QueryService,
    C: ResourceCatalog,
{
    pub fn new(service: S, catalog: C) -> Self {
        Self {
            service,
            catalog,
            settings: PollSettings::default(),
        }
    }

    pub fn with_poll_settings(mut self, settings: PollSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub async fn run<O>(
        &self,
        spec: &QuerySpec,
        observer: &mut O,
        cancel: &CancellationToken,
    ) -> Result<QueryOutcome, QueryError>
    where
        O: QueryObserver + ?Sized,
    {
        // Both bounds are resolved against the same instant.
        let now = Local::now();
        let start = resolve_at(&spec.start, &now)?;
        let end = resolve_at(&spec.end, &now)?;
        tracing::debug!(start, end, "resolved time range");

        let resources = interruptible(cancel, validate(&self.catalog, &spec.patterns)).await?;
        observer.resources_resolved(&resources);

        let request = QueryRequest {
            query: spec.query.clone(),
            resources: resources.names.clone(),
            start,
            end,
            limit: spec.limit,
        };
        let query_id = interruptible(cancel, submit(&self.service, &request)).await?;
        observer.query_submitted(&query_id, &request);

        let response =
            await_completion(&self.service, &query_id, self.settings, observer, cancel).await?;
        Ok(QueryOutcome {
            query_id,
            resources,
            start,
            end,
            response,
        })
    }
}

async fn interruptible<T, F>(cancel: &CancellationToken, work: F) -> Result<T, QueryError>
where
    F: Future<Output = Result<T, QueryError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(QueryError::Interrupted { query_id: None }),
        result = work => result,
    }
}
