use protocol::QueryRequest;

use crate::error::QueryError;
use crate::service::{QueryService, ServiceError};

/// Open a remote execution for `request` and return its id.
///
/// Rate limiting is surfaced immediately as [`QueryError::RateLimited`];
/// retrying is left to the caller.
pub async fn submit<S>(service: &S, request: &QueryRequest) -> Result<String, QueryError>
where
    S: QueryService + ?Sized,
{
    if request.start >= request.end {
        return Err(QueryError::InvalidTimeRange {
            start: request.start,
            end: request.end,
        });
    }
    if request.resources.is_empty() {
        return Err(QueryError::NoResources);
    }

    match service.submit(request).await {
        Ok(query_id) => {
            tracing::info!(
                query_id = %query_id,
                log_groups = request.resources.len(),
                start = request.start,
                end = request.end,
                "query submitted"
            );
            Ok(query_id)
        }
        Err(err) => {
            tracing::warn!(error = %err, "query submission rejected");
            Err(submission_error(err))
        }
    }
}

fn submission_error(err: ServiceError) -> QueryError {
    match err {
        ServiceError::MalformedQuery(message) | ServiceError::InvalidParameter(message) => {
            QueryError::QuerySyntax { message }
        }
        ServiceError::RateLimited(message) => QueryError::RateLimited { message },
        ServiceError::NotFound(message) | ServiceError::Other(message) => {
            QueryError::Submission { message }
        }
    }
}
