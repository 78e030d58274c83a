use crate::sync::{DataRequest, QueryCache, QueryIdentity, SubscriptionHandle};
use crate::tui::stream::Message;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Keeps the cache subscriptions of the visible view in line with what it asks for.
///
/// Each subscription gets a forwarder task that turns cache snapshots into
/// `Message::Entry`; unsubscribing closes the cache side, which ends the task.
pub struct ViewSubscriptions {
    cache: QueryCache,
    tx: mpsc::Sender<Message>,
    handles: HashMap<QueryIdentity, SubscriptionHandle>,
}

impl ViewSubscriptions {
    #[must_use]
    pub fn new(cache: QueryCache, tx: mpsc::Sender<Message>) -> Self {
        Self {
            cache,
            tx,
            handles: HashMap::new(),
        }
    }

    /// Subscribe to the requests not yet held, drop the ones no longer wanted
    pub async fn sync(&mut self, requests: Vec<DataRequest>) {
        let wanted: HashMap<QueryIdentity, DataRequest> = requests
            .into_iter()
            .map(|request| (request.identity(), request))
            .collect();

        let stale: Vec<QueryIdentity> = self
            .handles
            .keys()
            .filter(|identity| !wanted.contains_key(*identity))
            .cloned()
            .collect();
        for identity in stale {
            if let Some(handle) = self.handles.remove(&identity) {
                self.cache.unsubscribe(&handle).await;
                debug!("View released {}", identity);
            }
        }

        for (identity, request) in wanted {
            if self.handles.contains_key(&identity) {
                continue;
            }
            match self.cache.subscribe(request).await {
                Ok((handle, mut updates)) => {
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        while let Some(entry) = updates.recv().await {
                            if tx.send(Message::Entry(entry)).await.is_err() {
                                break;
                            }
                        }
                    });
                    debug!("View subscribed {}", identity);
                    self.handles.insert(identity, handle);
                }
                Err(e) => warn!("Cannot subscribe {}: {}", identity, e),
            }
        }
    }

    pub async fn release_all(&mut self) {
        self.sync(Vec::new()).await;
    }
}
