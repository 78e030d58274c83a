use super::cached_data::CacheEntry;
use super::identity::QueryIdentity;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Receiving half handed to a view; yields every snapshot of its entry in order
pub type EntryUpdates = mpsc::UnboundedReceiver<Arc<CacheEntry>>;

/// Returned by `QueryCache::subscribe`, given back to unsubscribe
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    pub id: String,
    pub identity: QueryIdentity,
}

#[derive(Debug)]
pub struct Subscriber {
    pub id: String,
    sender: mpsc::UnboundedSender<Arc<CacheEntry>>,
}

impl Subscriber {
    #[must_use]
    pub fn new() -> (Self, EntryUpdates) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = Uuid::new_v4().to_string();

        (Self { id, sender: tx }, rx)
    }

    /// False once the receiver is gone
    pub fn deliver(&self, entry: &Arc<CacheEntry>) -> bool {
        self.sender.send(Arc::clone(entry)).is_ok()
    }
}

/// Subscribers of one identity
#[derive(Debug, Default)]
pub struct SubscriberSet {
    subscribers: Vec<Subscriber>,
}

impl SubscriberSet {
    pub fn add(&mut self, subscriber: Subscriber) {
        self.subscribers.push(subscriber);
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// Sends the snapshot to everyone, dropping subscribers whose receiver closed
    pub fn notify(&mut self, entry: &Arc<CacheEntry>) {
        self.subscribers.retain(|s| s.deliver(entry));
    }

    pub fn prune(&mut self) {
        self.subscribers.retain(|s| !s.sender.is_closed());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::identity::Endpoint;

    fn entry() -> Arc<CacheEntry> {
        Arc::new(CacheEntry::new(QueryIdentity::new(Endpoint::Status)))
    }

    #[tokio::test]
    async fn test_subscribe_unsubscribe() {
        let mut set = SubscriberSet::default();
        let (first, _rx1) = Subscriber::new();
        let (second, _rx2) = Subscriber::new();
        let first_id = first.id.clone();

        set.add(first);
        set.add(second);
        assert_eq!(set.len(), 2);

        assert!(set.remove(&first_id));
        assert!(!set.remove(&first_id));
        assert_eq!(set.len(), 1);
    }

    #[tokio::test]
    async fn test_notify_delivers_same_snapshot() {
        let mut set = SubscriberSet::default();
        let (subscriber, mut rx) = Subscriber::new();
        set.add(subscriber);

        let snapshot = entry();
        set.notify(&snapshot);

        let received = rx.recv().await.unwrap();
        assert!(Arc::ptr_eq(&received, &snapshot));
    }

    #[tokio::test]
    async fn test_closed_receivers_are_pruned() {
        let mut set = SubscriberSet::default();
        let (kept, _rx) = Subscriber::new();
        let (gone, rx_gone) = Subscriber::new();
        set.add(kept);
        set.add(gone);
        drop(rx_gone);

        set.notify(&entry());
        assert_eq!(set.len(), 1);
    }
}
