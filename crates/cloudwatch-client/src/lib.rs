//! CloudWatch Logs Insights backend for the query engine.

use anyhow::Context;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_cloudwatchlogs::config::Region;
use aws_sdk_cloudwatchlogs::error::{DisplayErrorContext, SdkError};
use aws_sdk_cloudwatchlogs::operation::get_query_results::GetQueryResultsError;
use aws_sdk_cloudwatchlogs::operation::start_query::StartQueryError;
use aws_sdk_cloudwatchlogs::types::{
    QueryStatistics as AwsStatistics, QueryStatus as AwsStatus, ResultField,
};
use aws_sdk_cloudwatchlogs::Client;
use protocol::{EpochMillis, QueryRequest, QueryResponse, QueryStatistics, QueryStatus, ResultRow};
use query_engine::{QueryService, ResourceCatalog, ServiceError};
use std::error::Error as StdError;

#[derive(Clone, Debug)]
pub struct CloudWatchLogs {
    client: Client,
}

impl CloudWatchLogs {
    /// Build a client from the standard AWS credential and region chain,
    /// optionally pinned to a named profile and region.
    pub async fn connect(profile: Option<&str>, region: Option<&str>) -> anyhow::Result<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_string()));
        }
        let config = loader.load().await;
        let resolved = config
            .region()
            .map(|region| region.to_string())
            .context("no AWS region configured (use --region or set AWS_REGION)")?;
        tracing::debug!(profile = ?profile, region = %resolved, "aws config loaded");
        Ok(Self {
            client: Client::new(&config),
        })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceCatalog for CloudWatchLogs {
    async fn list_by_prefix(&self, prefix: &str) -> Result<Vec<String>, ServiceError> {
        let mut pages = self
            .client
            .describe_log_groups()
            .log_group_name_prefix(prefix)
            .into_paginator()
            .send();
        let mut names = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|err| ServiceError::Other(error_text(&err)))?;
            names.extend(
                page.log_groups()
                    .iter()
                    .filter_map(|group| group.log_group_name())
                    .map(str::to_string),
            );
        }
        tracing::debug!(prefix = %prefix, count = names.len(), "listed log groups");
        Ok(names)
    }

    async fn exists(&self, name: &str) -> Result<bool, ServiceError> {
        let output = self
            .client
            .describe_log_groups()
            .log_group_name_prefix(name)
            .limit(1)
            .send()
            .await
            .map_err(|err| ServiceError::Other(error_text(&err)))?;
        Ok(output
            .log_groups()
            .first()
            .and_then(|group| group.log_group_name())
            == Some(name))
    }
}

#[async_trait]
impl QueryService for CloudWatchLogs {
    async fn submit(&self, request: &QueryRequest) -> Result<String, ServiceError> {
        let output = self
            .client
            .start_query()
            .set_log_group_names(Some(request.resources.clone()))
            .start_time(floor_seconds(request.start))
            .end_time(ceil_seconds(request.end))
            .query_string(&request.query)
            .limit(i32::try_from(request.limit).unwrap_or(i32::MAX))
            .send()
            .await
            .map_err(start_query_error)?;
        output
            .query_id()
            .map(str::to_string)
            .ok_or_else(|| ServiceError::Other("StartQuery returned no query id".to_string()))
    }

    async fn get_status(&self, query_id: &str) -> Result<QueryResponse, ServiceError> {
        let output = self
            .client
            .get_query_results()
            .query_id(query_id)
            .send()
            .await
            .map_err(get_results_error)?;
        let status = map_status(output.status());
        let statistics = output.statistics().map(map_statistics);
        tracing::trace!(query_id = %query_id, status = %status, "fetched query status");
        if status.is_success() {
            let rows = output.results().iter().map(|row| map_row(row.as_slice())).collect();
            return Ok(QueryResponse::complete(statistics, rows));
        }
        if status.is_terminal() {
            return Ok(QueryResponse::terminated(status, statistics));
        }
        Ok(QueryResponse::running(statistics))
    }
}

fn start_query_error(err: SdkError<StartQueryError>) -> ServiceError {
    let message = error_text(&err);
    let service_error = err.into_service_error();
    if service_error.is_malformed_query_exception() {
        ServiceError::MalformedQuery(message)
    } else if service_error.is_invalid_parameter_exception() {
        ServiceError::InvalidParameter(message)
    } else if service_error.is_limit_exceeded_exception() {
        ServiceError::RateLimited(message)
    } else if service_error.is_resource_not_found_exception() {
        ServiceError::NotFound(message)
    } else {
        ServiceError::Other(message)
    }
}

fn get_results_error(err: SdkError<GetQueryResultsError>) -> ServiceError {
    let message = error_text(&err);
    if err.into_service_error().is_resource_not_found_exception() {
        ServiceError::NotFound(message)
    } else {
        ServiceError::Other(message)
    }
}

fn error_text<E: StdError>(err: &E) -> String {
    DisplayErrorContext(err).to_string()
}

/// `Scheduled`, `Unknown` and values this SDK does not know yet are still
/// in flight as far as polling is concerned.
fn map_status(status: Option<&AwsStatus>) -> QueryStatus {
    match status {
        Some(AwsStatus::Complete) => QueryStatus::Complete,
        Some(AwsStatus::Failed) => QueryStatus::Failed,
        Some(AwsStatus::Cancelled) => QueryStatus::Cancelled,
        Some(AwsStatus::Timeout) => QueryStatus::Timeout,
        _ => QueryStatus::Running,
    }
}

fn map_statistics(stats: &AwsStatistics) -> QueryStatistics {
    QueryStatistics {
        records_scanned: counter(stats.records_scanned()),
        records_matched: counter(stats.records_matched()),
        bytes_scanned: counter(stats.bytes_scanned()),
    }
}

fn counter(value: f64) -> u64 {
    // Float-to-int `as` saturates; negatives and NaN become 0.
    value.round() as u64
}

fn map_row(fields: &[ResultField]) -> ResultRow {
    fields
        .iter()
        .filter_map(|field| {
            let name = field.field()?;
            Some((name.to_string(), field.value().unwrap_or_default().to_string()))
        })
        .collect()
}

fn floor_seconds(millis: EpochMillis) -> i64 {
    millis.div_euclid(1_000)
}

fn ceil_seconds(millis: EpochMillis) -> i64 {
    let seconds = millis.div_euclid(1_000);
    if millis.rem_euclid(1_000) == 0 {
        seconds
    } else {
        seconds + 1
    }
}
