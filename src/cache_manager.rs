/**
Process-wide sync context for the console

Owns the one query cache every view subscribes to, the mutation coordinator
and the notification center, and tears them down together on exit.
*/
use crate::api::ApiClient;
use crate::error::Result;
use crate::settings::Settings;
use crate::sync::{Fetcher, MutationCoordinator, NotificationCenter, QueryCache, SyncConfig};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct SyncContext {
    pub cache: QueryCache,
    pub mutations: MutationCoordinator,
    pub notifications: NotificationCenter,
}

impl SyncContext {
    #[must_use]
    pub fn new(fetcher: Arc<dyn Fetcher>, config: &SyncConfig) -> Self {
        let cache = QueryCache::new(Arc::clone(&fetcher), config.clone());
        let notifications = NotificationCenter::new(config.notification_ttl);
        let mutations = MutationCoordinator::new(
            fetcher,
            cache.clone(),
            notifications.clone(),
            config.request_timeout,
        );
        info!(
            "Sync context ready (capacity {}, timeout {}s, notifications {}ms)",
            config.cache_capacity,
            config.request_timeout.as_secs(),
            config.notification_ttl.as_millis()
        );
        Self {
            cache,
            mutations,
            notifications,
        }
    }

    /// Context talking to the admin api described by `settings`
    ///
    /// # Errors
    ///
    /// Will return `Err` if the HTTP client cannot be built
    pub fn connect(settings: &Settings) -> Result<Self> {
        let client = ApiClient::new(&settings.api)?;
        info!("Using admin api at {}", client.base_url());
        Ok(Self::new(Arc::new(client), &settings.sync))
    }

    /// Stops every poll timer and pending notification timer
    pub async fn shutdown(&self) {
        self.cache.shutdown().await;
        self.notifications.clear();
        info!("Sync context shut down");
    }
}
