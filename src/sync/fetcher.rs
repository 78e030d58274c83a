use super::config::{
    CONFIG_STALE_MS, EVENTS_POLL_MS, EVENTS_STALE_MS, LOGS_POLL_MS, LOGS_STALE_MS,
    STATUS_POLL_MS, STATUS_STALE_MS,
};
use super::identity::{Endpoint, QueryIdentity};
use super::mutation::{Mutation, MutationReply};
use super::pagination::PageQuery;
use crate::api::{AdminConfig, ApiClient, Event, LogEntry, Page, Status};
use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// A read the cache can issue on behalf of a view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataRequest {
    Status,
    Config,
    Logs(PageQuery),
    Events(PageQuery),
}

impl DataRequest {
    #[must_use]
    pub const fn endpoint(&self) -> Endpoint {
        match self {
            Self::Status => Endpoint::Status,
            Self::Config => Endpoint::Config,
            Self::Logs(_) => Endpoint::Logs,
            Self::Events(_) => Endpoint::Events,
        }
    }

    #[must_use]
    pub fn identity(&self) -> QueryIdentity {
        match self {
            Self::Status | Self::Config => QueryIdentity::new(self.endpoint()),
            Self::Logs(query) | Self::Events(query) => {
                QueryIdentity::with_params(self.endpoint(), query.params())
            }
        }
    }

    /// Config is edited by hand and never polled
    #[must_use]
    pub const fn poll_interval(&self) -> Option<Duration> {
        match self {
            Self::Status => Some(Duration::from_millis(STATUS_POLL_MS)),
            Self::Config => None,
            Self::Logs(_) => Some(Duration::from_millis(LOGS_POLL_MS)),
            Self::Events(_) => Some(Duration::from_millis(EVENTS_POLL_MS)),
        }
    }

    #[must_use]
    pub const fn stale_after(&self) -> Duration {
        match self {
            Self::Status => Duration::from_millis(STATUS_STALE_MS),
            Self::Config => Duration::from_millis(CONFIG_STALE_MS),
            Self::Logs(_) => Duration::from_millis(LOGS_STALE_MS),
            Self::Events(_) => Duration::from_millis(EVENTS_STALE_MS),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult {
    Status(Status),
    Config(Box<AdminConfig>),
    Logs(Page<LogEntry>),
    Events(Page<Event>),
}

impl FetchResult {
    #[must_use]
    pub const fn status(&self) -> Option<&Status> {
        match self {
            Self::Status(status) => Some(status),
            _ => None,
        }
    }

    #[must_use]
    pub fn config(&self) -> Option<&AdminConfig> {
        match self {
            Self::Config(config) => Some(config),
            _ => None,
        }
    }

    #[must_use]
    pub const fn logs(&self) -> Option<&Page<LogEntry>> {
        match self {
            Self::Logs(page) => Some(page),
            _ => None,
        }
    }

    #[must_use]
    pub const fn events(&self) -> Option<&Page<Event>> {
        match self {
            Self::Events(page) => Some(page),
            _ => None,
        }
    }

    /// Rows carried by the result, for logging
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Status(_) | Self::Config(_) => 1,
            Self::Logs(page) => page.data.len(),
            Self::Events(page) => page.data.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Transport seam of the sync layer: one network call per invocation
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &DataRequest) -> Result<FetchResult>;

    async fn execute(&self, mutation: &Mutation) -> Result<MutationReply>;
}

#[async_trait]
impl Fetcher for ApiClient {
    async fn fetch(&self, request: &DataRequest) -> Result<FetchResult> {
        let result = match request {
            DataRequest::Status => FetchResult::Status(self.get_status().await?),
            DataRequest::Config => FetchResult::Config(Box::new(self.get_config().await?)),
            DataRequest::Logs(query) => FetchResult::Logs(self.list_logs(query).await?),
            DataRequest::Events(query) => FetchResult::Events(self.list_events(query).await?),
        };
        Ok(result)
    }

    async fn execute(&self, mutation: &Mutation) -> Result<MutationReply> {
        let reply = match mutation {
            Mutation::StartWorker => MutationReply::Action(self.start_worker().await?),
            Mutation::StopWorker => MutationReply::Action(self.stop_worker().await?),
            Mutation::ResetWatermark(_) => MutationReply::Action(self.reset_watermark().await?),
            Mutation::SaveConfig(config) => MutationReply::Action(self.save_config(config).await?),
            Mutation::TestConnection(integration) => {
                MutationReply::Probe(self.test_connection(*integration).await?)
            }
            Mutation::DeleteEvent { id, .. } => {
                self.delete_event(id).await?;
                MutationReply::Removed
            }
            Mutation::DeleteEventsBatch { filter, .. } => {
                MutationReply::Deleted(self.delete_events_batch(filter).await?)
            }
            Mutation::UpdateEvent { id, changes } => {
                MutationReply::Event(Box::new(self.update_event(id, changes).await?))
            }
        };
        Ok(reply)
    }
}
