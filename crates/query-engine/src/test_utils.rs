use async_trait::async_trait;
use protocol::{QueryRequest, QueryResponse};
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::progress::{ProgressUpdate, QueryObserver};
use crate::resources::ResolvedResources;
use crate::service::{QueryService, ResourceCatalog, ServiceError};

pub(crate) struct FakeCatalog {
    names: Vec<String>,
    failure: Option<ServiceError>,
    prefix_calls: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub(crate) fn new<I, N>(names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            failure: None,
            prefix_calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_lambdas(count: usize) -> Self {
        Self::new((0..count).map(|index| format!("/aws/lambda/fn-{index:02}")))
    }

    pub(crate) fn failing(error: ServiceError) -> Self {
        Self {
            failure: Some(error),
            ..Self::new(Vec::<String>::new())
        }
    }

    pub(crate) fn prefix_calls(&self) -> Vec<String> {
        self.prefix_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResourceCatalog for FakeCatalog {
    async fn list_by_prefix(&self, prefix: &str) -> Result<Vec<String>, ServiceError> {
        self.prefix_calls.lock().unwrap().push(prefix.to_string());
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        Ok(self
            .names
            .iter()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn exists(&self, name: &str) -> Result<bool, ServiceError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        Ok(self.names.iter().any(|candidate| candidate == name))
    }
}

/// Replays canned status responses in order; once they run out every poll
/// reports `Running`.
pub(crate) struct ScriptedService {
    query_id: String,
    submit_error: Option<ServiceError>,
    statuses: Mutex<VecDeque<Result<QueryResponse, ServiceError>>>,
    submitted: Mutex<Vec<QueryRequest>>,
    polls: Mutex<usize>,
}

impl ScriptedService {
    pub(crate) fn new(query_id: &str) -> Self {
        Self {
            query_id: query_id.to_string(),
            submit_error: None,
            statuses: Mutex::new(VecDeque::new()),
            submitted: Mutex::new(Vec::new()),
            polls: Mutex::new(0),
        }
    }

    pub(crate) fn with_statuses<I>(self, statuses: I) -> Self
    where
        I: IntoIterator<Item = QueryResponse>,
    {
        self.statuses
            .lock()
            .unwrap()
            .extend(statuses.into_iter().map(Ok));
        self
    }

    pub(crate) fn with_status_error(self, error: ServiceError) -> Self {
        self.statuses.lock().unwrap().push_back(Err(error));
        self
    }

    pub(crate) fn rejecting(mut self, error: ServiceError) -> Self {
        self.submit_error = Some(error);
        self
    }

    pub(crate) fn submitted(&self) -> Vec<QueryRequest> {
        self.submitted.lock().unwrap().clone()
    }

    pub(crate) fn polls(&self) -> usize {
        *self.polls.lock().unwrap()
    }
}

#[async_trait]
impl QueryService for ScriptedService {
    async fn submit(&self, request: &QueryRequest) -> Result<String, ServiceError> {
        self.submitted.lock().unwrap().push(request.clone());
        match &self.submit_error {
            Some(err) => Err(err.clone()),
            None => Ok(self.query_id.clone()),
        }
    }

    async fn get_status(&self, _query_id: &str) -> Result<QueryResponse, ServiceError> {
        *self.polls.lock().unwrap() += 1;
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(QueryResponse::running(None)))
    }
}

#[derive(Default)]
pub(crate) struct RecordingObserver {
    pub(crate) resources: Vec<ResolvedResources>,
    pub(crate) submitted: Vec<String>,
    pub(crate) updates: Vec<ProgressUpdate>,
}

impl QueryObserver for RecordingObserver {
    fn resources_resolved(&mut self, resources: &ResolvedResources) {
        self.resources.push(resources.clone());
    }

    fn query_submitted(&mut self, query_id: &str, _request: &QueryRequest) {
        self.submitted.push(query_id.to_string());
    }

    fn progress(&mut self, update: &ProgressUpdate) {
        self.updates.push(update.clone());
    }
}
