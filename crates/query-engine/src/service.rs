use async_trait::async_trait;
use protocol::{QueryRequest, QueryResponse};

/// Failure reported by a remote collaborator, classified just enough for the
/// engine to pick an error kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("malformed query: {0}")]
    MalformedQuery(String),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("rate limit exceeded: {0}")]
    RateLimited(String),
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Other(String),
}

/// The remote query service. Executions are opened with [`submit`] and only
/// ever observed afterwards; nothing here cancels a running execution.
///
/// [`submit`]: QueryService::submit
#[async_trait]
pub trait QueryService: Send + Sync {
    async fn submit(&self, request: &QueryRequest) -> Result<String, ServiceError>;

    async fn get_status(&self, query_id: &str) -> Result<QueryResponse, ServiceError>;
}

/// The catalog of queryable resources (log groups).
#[async_trait]
pub trait ResourceCatalog: Send + Sync {
    /// All resource names starting with `prefix`, in catalog order.
    async fn list_by_prefix(&self, prefix: &str) -> Result<Vec<String>, ServiceError>;

    async fn exists(&self, name: &str) -> Result<bool, ServiceError>;
}
