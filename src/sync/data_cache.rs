use super::cached_data::{CacheEntry, FetchStatus};
use super::config::SyncConfig;
use super::errors::shut_down_error;
use super::fetcher::{DataRequest, FetchResult, Fetcher};
use super::identity::{Endpoint, QueryIdentity};
use super::ordering::{ApplyDecision, RequestSequencer};
use super::polling::{PollTick, PollingScheduler};
use super::subscription::{EntryUpdates, Subscriber, SubscriberSet, SubscriptionHandle};
use crate::api::ApiError;
use crate::error::Result;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::RwLock;
use tokio::time::{Instant, timeout};
use tracing::{debug, info, warn};

#[derive(Debug)]
struct Slot {
    request: DataRequest,
    entry: Arc<CacheEntry>,
    subscribers: SubscriberSet,
    sequencer: RequestSequencer,
    /// An invalidation arrived while a request was in flight
    refetch_queued: bool,
    last_used: Instant,
}

impl Slot {
    fn new(request: DataRequest) -> Self {
        let entry = Arc::new(CacheEntry::new(request.identity()));
        Self {
            request,
            entry,
            subscribers: SubscriberSet::default(),
            sequencer: RequestSequencer::new(),
            refetch_queued: false,
            last_used: Instant::now(),
        }
    }

    /// The one place an entry changes; subscribers see every snapshot in order
    fn publish(&mut self, entry: CacheEntry) {
        self.entry = Arc::new(entry);
        self.subscribers.notify(&self.entry);
    }

    fn begin_fetch(&mut self) -> u64 {
        let seq = self.sequencer.issue();
        self.publish(self.entry.begin_fetch(seq));
        seq
    }

    fn is_evictable(&self) -> bool {
        self.subscribers.is_empty() && !self.entry.is_loading()
    }
}

struct Inner {
    slots: RwLock<HashMap<QueryIdentity, Slot>>,
    fetcher: Arc<dyn Fetcher>,
    scheduler: PollingScheduler,
    config: SyncConfig,
    hits: AtomicU64,
    misses: AtomicU64,
    closed: AtomicBool,
}

/// Keyed store of query results shared by every view.
///
/// Guarantees at most one request in flight per identity, delivers each
/// entry transition to subscribers in order, and discards responses that
/// were overtaken by a newer request or by an invalidation.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<Inner>,
}

impl QueryCache {
    #[must_use]
    pub fn new(fetcher: Arc<dyn Fetcher>, config: SyncConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                slots: RwLock::new(HashMap::new()),
                fetcher,
                scheduler: PollingScheduler::new(),
                config,
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Registers interest in `request`.
    ///
    /// The current entry is the first item on the returned channel. A fetch
    /// starts when there is no data or the data is stale and nothing is in
    /// flight; the first subscriber of a polled request starts its timer.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the cache has been shut down
    #[allow(clippy::significant_drop_tightening)]
    pub async fn subscribe(
        &self,
        request: DataRequest,
    ) -> Result<(SubscriptionHandle, EntryUpdates)> {
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(shut_down_error("query cache"));
        }
        let identity = request.identity();
        let (subscriber, updates) = Subscriber::new();
        let handle = SubscriptionHandle {
            id: subscriber.id.clone(),
            identity: identity.clone(),
        };

        let mut slots = self.inner.slots.write().await;
        let slot = slots
            .entry(identity.clone())
            .or_insert_with(|| Slot::new(request.clone()));
        slot.last_used = Instant::now();

        subscriber.deliver(&slot.entry);
        let first = slot.subscribers.is_empty();
        slot.subscribers.add(subscriber);

        let stale = slot.entry.data.is_none() || slot.entry.is_stale(request.stale_after());
        if !stale {
            self.inner.hits.fetch_add(1, Ordering::Relaxed);
            debug!("🎯 Cache HIT: {}", identity);
        } else if slot.entry.is_loading() {
            self.inner.misses.fetch_add(1, Ordering::Relaxed);
            debug!("🔗 Cache JOIN: {} (#{} in flight)", identity, slot.sequencer.last_issued());
        } else {
            self.inner.misses.fetch_add(1, Ordering::Relaxed);
            debug!("❌ Cache MISS: {}", identity);
            let seq = slot.begin_fetch();
            self.inner.spawn_fetch(identity.clone(), slot.request.clone(), seq);
        }

        if first {
            if let Some(interval) = request.poll_interval() {
                self.inner
                    .scheduler
                    .register(identity.clone(), interval, self.inner.poll_tick());
            }
        }

        self.inner.evict_over_capacity(&mut slots);
        Ok((handle, updates))
    }

    /// Removes one subscriber; the last one out stops the poll timer.
    /// The entry itself stays cached until evicted.
    pub async fn unsubscribe(&self, handle: &SubscriptionHandle) -> bool {
        let mut slots = self.inner.slots.write().await;
        let Some(slot) = slots.get_mut(&handle.identity) else {
            return false;
        };
        let removed = slot.subscribers.remove(&handle.id);
        slot.subscribers.prune();
        slot.last_used = Instant::now();
        if slot.subscribers.is_empty() {
            if self.inner.scheduler.cancel(&handle.identity) {
                debug!("🔕 Last subscriber left: {}", handle.identity);
            }
            // a queued refetch is only wanted by subscribers
            slot.refetch_queued = false;
        }
        self.inner.evict_over_capacity(&mut slots);
        removed
    }

    /// Marks the entry stale and refetches it if anyone is subscribed.
    ///
    /// A response already in flight is discarded and a new request follows
    /// it, so the data observed next was requested after this call.
    /// Returns false when the identity is not cached.
    pub async fn invalidate(&self, identity: &QueryIdentity) -> bool {
        let mut slots = self.inner.slots.write().await;
        let Some(slot) = slots.get_mut(identity) else {
            return false;
        };
        self.inner.invalidate_slot(identity, slot);
        true
    }

    /// Invalidates every cached identity of `endpoint` and returns them
    pub async fn invalidate_endpoint(&self, endpoint: Endpoint) -> Vec<QueryIdentity> {
        let mut slots = self.inner.slots.write().await;
        let mut invalidated = Vec::new();
        for (identity, slot) in slots.iter_mut() {
            if identity.endpoint == endpoint {
                self.inner.invalidate_slot(identity, slot);
                invalidated.push(identity.clone());
            }
        }
        invalidated.sort();
        invalidated
    }

    /// Manual refresh: joins a request already in flight, otherwise starts one
    ///
    /// # Errors
    ///
    /// Will return `Err` if the cache has been shut down
    pub async fn refetch(&self, identity: &QueryIdentity) -> Result<bool> {
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(shut_down_error("query cache"));
        }
        let mut slots = self.inner.slots.write().await;
        let Some(slot) = slots.get_mut(identity) else {
            return Ok(false);
        };
        if slot.entry.is_loading() {
            return Ok(false);
        }
        let seq = slot.begin_fetch();
        self.inner
            .spawn_fetch(identity.clone(), slot.request.clone(), seq);
        Ok(true)
    }

    pub async fn get(&self, identity: &QueryIdentity) -> Option<Arc<CacheEntry>> {
        let slots = self.inner.slots.read().await;
        slots.get(identity).map(|slot| Arc::clone(&slot.entry))
    }

    #[must_use]
    pub fn is_polling(&self, identity: &QueryIdentity) -> bool {
        self.inner.scheduler.is_registered(identity)
    }

    #[allow(clippy::significant_drop_tightening)]
    pub async fn stats(&self) -> CacheStats {
        let slots = self.inner.slots.read().await;

        let mut stats = CacheStats {
            total_entries: slots.len(),
            active_polls: self.inner.scheduler.active(),
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
            ..CacheStats::default()
        };
        for slot in slots.values() {
            stats.subscribers += slot.subscribers.len();
            if slot.entry.is_loading() {
                stats.loading_entries += 1;
            }
            if slot.entry.status == FetchStatus::Error {
                stats.error_entries += 1;
            }
            if slot.entry.data.is_some() && !slot.entry.is_stale(slot.request.stale_after()) {
                stats.fresh_entries += 1;
            } else {
                stats.stale_entries += 1;
            }
        }
        stats
    }

    /// Stops every timer and drops every subscriber; in-flight fetches finish
    /// and are discarded
    pub async fn shutdown(&self) {
        self.inner.closed.store(true, Ordering::Release);
        self.inner.scheduler.cancel_all();
        let mut slots = self.inner.slots.write().await;
        let dropped = slots.len();
        slots.clear();
        info!("🛑 Query cache shut down ({} entries dropped)", dropped);
    }
}

impl Inner {
    fn spawn_fetch(self: &Arc<Self>, identity: QueryIdentity, request: DataRequest, seq: u64) {
        let inner = Arc::clone(self);
        tokio::spawn(async move {
            debug!("🔄 FETCH START: {} (#{})", identity, seq);
            let started = Instant::now();
            let result = match timeout(inner.config.request_timeout, inner.fetcher.fetch(&request)).await {
                Ok(result) => result,
                Err(_) => Err(ApiError::Timeout(inner.config.request_timeout).into()),
            };
            debug!(
                "🏁 FETCH DONE: {} (#{}) in {}ms",
                identity,
                seq,
                started.elapsed().as_millis()
            );
            inner.settle(&identity, seq, result).await;
        });
    }

    #[allow(clippy::significant_drop_tightening)]
    async fn settle(self: &Arc<Self>, identity: &QueryIdentity, seq: u64, result: Result<FetchResult>) {
        let mut slots = self.slots.write().await;
        let Some(slot) = slots.get_mut(identity) else {
            debug!("🗑️  Dropping response #{} for evicted {}", seq, identity);
            return;
        };

        match slot.sequencer.classify(seq) {
            ApplyDecision::Apply => match result {
                Ok(data) => {
                    info!("💾 Cache STORE: {} ({} rows)", identity, data.len());
                    let next = slot.entry.complete(data);
                    slot.publish(next);
                }
                Err(e) => {
                    warn!("❌ FETCH FAILED: {}: {}", identity, e);
                    let next = slot.entry.fail(e.reason());
                    slot.publish(next);
                }
            },
            decision => {
                debug!("⏭️  Discarding response #{} for {}: {:?}", seq, identity, decision);
            }
        }

        let queued = std::mem::take(&mut slot.refetch_queued);
        if queued && !slot.subscribers.is_empty() {
            let next_seq = slot.begin_fetch();
            self.spawn_fetch(identity.clone(), slot.request.clone(), next_seq);
        } else if slot.entry.in_flight == Some(seq) {
            let next = slot.entry.abandon();
            slot.publish(next);
        }

        self.evict_over_capacity(&mut slots);
    }

    fn invalidate_slot(self: &Arc<Self>, identity: &QueryIdentity, slot: &mut Slot) {
        slot.subscribers.prune();
        if slot.entry.is_loading() {
            debug!("♻️  Invalidate IN FLIGHT: {} (refetch queued)", identity);
            slot.sequencer.invalidate_issued();
            slot.refetch_queued = true;
            let next = slot.entry.mark_stale();
            slot.publish(next);
        } else if slot.subscribers.is_empty() {
            debug!("♻️  Invalidate IDLE: {}", identity);
            let next = slot.entry.mark_stale();
            slot.publish(next);
        } else {
            debug!("♻️  Invalidate REFETCH: {}", identity);
            let seq = slot.begin_fetch();
            self.spawn_fetch(identity.clone(), slot.request.clone(), seq);
        }
    }

    /// Poll tick: refetch unless a request is already in flight
    async fn tick(self: &Arc<Self>, identity: &QueryIdentity) {
        let mut slots = self.slots.write().await;
        let Some(slot) = slots.get_mut(identity) else {
            self.scheduler.cancel(identity);
            return;
        };
        slot.subscribers.prune();
        if slot.subscribers.is_empty() {
            self.scheduler.cancel(identity);
            return;
        }
        if let Some(in_flight) = slot.entry.in_flight {
            debug!("⏳ POLL SKIP: {} (#{} in flight)", identity, in_flight);
            return;
        }
        let seq = slot.begin_fetch();
        self.spawn_fetch(identity.clone(), slot.request.clone(), seq);
    }

    fn poll_tick(self: &Arc<Self>) -> PollTick {
        let weak: Weak<Self> = Arc::downgrade(self);
        Arc::new(move |identity| {
            let weak = weak.clone();
            Box::pin(async move {
                if let Some(inner) = weak.upgrade() {
                    inner.tick(&identity).await;
                }
            })
        })
    }

    fn evict_over_capacity(&self, slots: &mut HashMap<QueryIdentity, Slot>) {
        while slots.len() > self.config.cache_capacity {
            let oldest = slots
                .iter()
                .filter(|(_, slot)| slot.is_evictable())
                .min_by_key(|(_, slot)| slot.last_used)
                .map(|(identity, _)| identity.clone());
            let Some(identity) = oldest else {
                break;
            };
            slots.remove(&identity);
            debug!("🧹 Cache EVICT: {}", identity);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub fresh_entries: usize,
    pub stale_entries: usize,
    pub loading_entries: usize,
    pub error_entries: usize,
    pub subscribers: usize,
    pub active_polls: usize,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64 * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Page, Status};
    use crate::sync::mutation::{Mutation, MutationReply};
    use crate::sync::pagination::PageQuery;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tokio::sync::oneshot;

    /// Each fetch parks until the test releases it with a result
    #[derive(Default)]
    struct GatedFetcher {
        calls: AtomicUsize,
        gates: Mutex<Vec<(QueryIdentity, oneshot::Sender<Result<FetchResult>>)>>,
    }

    impl GatedFetcher {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        async fn release(&self, identity: &QueryIdentity, result: Result<FetchResult>) {
            let gate = {
                let mut gates = self.gates.lock().unwrap();
                let index = gates.iter().position(|(i, _)| i == identity).unwrap();
                gates.remove(index).1
            };
            gate.send(result).ok();
            settle().await;
        }
    }

    #[async_trait]
    impl Fetcher for GatedFetcher {
        async fn fetch(&self, request: &DataRequest) -> Result<FetchResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().push((request.identity(), tx));
            rx.await
                .unwrap_or_else(|_| Err(crate::error::Error::Custom("gate dropped".to_string())))
        }

        async fn execute(&self, _mutation: &Mutation) -> Result<MutationReply> {
            Ok(MutationReply::Removed)
        }
    }

    fn status(running: bool) -> Result<FetchResult> {
        Ok(FetchResult::Status(Status {
            worker_running: running,
            ..Status::default()
        }))
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    fn cache(fetcher: &Arc<GatedFetcher>) -> QueryCache {
        QueryCache::new(fetcher.clone(), SyncConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_share_one_fetch() {
        let fetcher = Arc::new(GatedFetcher::default());
        let cache = cache(&fetcher);

        let (_a, mut rx_a) = cache.subscribe(DataRequest::Status).await.unwrap();
        let (_b, mut rx_b) = cache.subscribe(DataRequest::Status).await.unwrap();
        let (_c, _rx_c) = cache.subscribe(DataRequest::Status).await.unwrap();
        settle().await;
        assert_eq!(fetcher.calls(), 1);

        fetcher.release(&QueryIdentity::new(Endpoint::Status), status(true)).await;

        let last_a = drain(&mut rx_a);
        let last_b = drain(&mut rx_b);
        assert!(Arc::ptr_eq(&last_a, &last_b));
        assert_eq!(last_a.status, FetchStatus::Success);
    }

    fn drain(rx: &mut EntryUpdates) -> Arc<CacheEntry> {
        let mut last = None;
        while let Ok(entry) = rx.try_recv() {
            last = Some(entry);
        }
        last.unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_delivery_is_current_entry() {
        let fetcher = Arc::new(GatedFetcher::default());
        let cache = cache(&fetcher);

        let (_h, mut rx) = cache.subscribe(DataRequest::Status).await.unwrap();
        let first = rx.recv().await.unwrap();
        assert_eq!(first.status, FetchStatus::Idle);
        let second = rx.recv().await.unwrap();
        assert_eq!(second.status, FetchStatus::Loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_data_and_is_not_retried_inline() {
        let fetcher = Arc::new(GatedFetcher::default());
        let cache = cache(&fetcher);
        let identity = QueryIdentity::new(Endpoint::Status);

        let (_h, _rx) = cache.subscribe(DataRequest::Status).await.unwrap();
        settle().await;
        fetcher.release(&identity, status(true)).await;

        assert!(cache.refetch(&identity).await.unwrap());
        settle().await;
        fetcher
            .release(
                &identity,
                Err(ApiError::Timeout(Duration::from_secs(10)).into()),
            )
            .await;

        let entry = cache.get(&identity).await.unwrap();
        assert_eq!(entry.status, FetchStatus::Error);
        assert_eq!(entry.error.as_deref(), Some("timeout of 10000ms exceeded"));
        assert!(entry.data.as_ref().and_then(FetchResult::status).unwrap().worker_running);
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_without_subscribers_only_marks_stale() {
        let fetcher = Arc::new(GatedFetcher::default());
        let cache = cache(&fetcher);
        let identity = QueryIdentity::new(Endpoint::Status);

        let (handle, _rx) = cache.subscribe(DataRequest::Status).await.unwrap();
        settle().await;
        fetcher.release(&identity, status(false)).await;
        assert!(cache.unsubscribe(&handle).await);

        assert!(cache.invalidate(&identity).await);
        settle().await;
        assert_eq!(fetcher.calls(), 1);
        assert!(cache.get(&identity).await.unwrap().stale);

        // the next subscriber fetches fresh data
        let (_h, _rx) = cache.subscribe(DataRequest::Status).await.unwrap();
        settle().await;
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_entry_is_a_hit() {
        let fetcher = Arc::new(GatedFetcher::default());
        let cache = cache(&fetcher);

        let (handle, _rx) = cache.subscribe(DataRequest::Config).await.unwrap();
        settle().await;
        fetcher
            .release(&QueryIdentity::new(Endpoint::Config), Ok(FetchResult::Config(Box::default())))
            .await;
        cache.unsubscribe(&handle).await;

        let (_h, _rx) = cache.subscribe(DataRequest::Config).await.unwrap();
        settle().await;
        assert_eq!(fetcher.calls(), 1);

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate() - 50.0).abs() < f64::EPSILON);
        assert_eq!(stats.active_polls, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_eviction_spares_subscribed_entries() {
        let fetcher = Arc::new(GatedFetcher::default());
        let cache = QueryCache::new(
            fetcher.clone(),
            SyncConfig {
                cache_capacity: 1,
                ..SyncConfig::default()
            },
        );

        let (_keep, _rx) = cache.subscribe(DataRequest::Status).await.unwrap();
        let events = DataRequest::Events(PageQuery::default());
        let (handle, _rx2) = cache.subscribe(events.clone()).await.unwrap();
        settle().await;
        fetcher
            .release(&events.identity(), Ok(FetchResult::Events(Page::empty(1))))
            .await;
        fetcher
            .release(&QueryIdentity::new(Endpoint::Status), status(true))
            .await;

        cache.unsubscribe(&handle).await;
        assert!(cache.get(&events.identity()).await.is_none());
        assert!(cache.get(&QueryIdentity::new(Endpoint::Status)).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_tick_skips_while_fetch_in_flight() {
        let fetcher = Arc::new(GatedFetcher::default());
        let cache = cache(&fetcher);
        let identity = QueryIdentity::new(Endpoint::Status);

        let (_h, _rx) = cache.subscribe(DataRequest::Status).await.unwrap();
        settle().await;
        assert_eq!(fetcher.calls(), 1);

        // first tick lands while the initial fetch is still parked
        tokio::time::advance(Duration::from_secs(5)).await;
        settle().await;
        assert_eq!(fetcher.calls(), 1);
        assert!(cache.is_polling(&identity));

        fetcher.release(&identity, status(true)).await;
        tokio::time::advance(Duration::from_secs(5)).await;
        settle().await;
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_fetch_times_out_and_next_tick_retries() {
        let fetcher = Arc::new(GatedFetcher::default());
        let cache = cache(&fetcher);
        let logs = DataRequest::Logs(PageQuery::default());
        let identity = logs.identity();

        let (_h, _rx) = cache.subscribe(logs).await.unwrap();
        settle().await;
        let mut page = Page::empty(1);
        page.total = 7;
        fetcher.release(&identity, Ok(FetchResult::Logs(page))).await;

        // the tick at 3s starts a fetch that never answers; ticks at 6, 9, 12 skip it
        for _ in 0..4 {
            tokio::time::advance(Duration::from_secs(3)).await;
            settle().await;
        }
        assert_eq!(fetcher.calls(), 2);
        assert!(cache.get(&identity).await.unwrap().is_loading());

        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;
        let entry = cache.get(&identity).await.unwrap();
        assert_eq!(entry.status, FetchStatus::Error);
        assert_eq!(entry.error.as_deref(), Some("timeout of 10000ms exceeded"));
        assert_eq!(entry.data.as_ref().and_then(FetchResult::logs).map(|p| p.total), Some(7));

        tokio::time::advance(Duration::from_secs(2)).await;
        settle().await;
        assert_eq!(fetcher.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_outlives_its_last_subscriber() {
        let fetcher = Arc::new(GatedFetcher::default());
        let cache = cache(&fetcher);
        let identity = QueryIdentity::new(Endpoint::Status);

        let (handle, mut rx) = cache.subscribe(DataRequest::Status).await.unwrap();
        settle().await;
        assert!(cache.unsubscribe(&handle).await);
        assert!(!cache.is_polling(&identity));
        while rx.try_recv().is_ok() {}

        fetcher.release(&identity, status(true)).await;
        let entry = cache.get(&identity).await.unwrap();
        assert!(!entry.is_loading());
        assert!(rx.try_recv().is_err());
        assert_eq!(cache.stats().await.subscribers, 0);

        tokio::time::advance(Duration::from_secs(30)).await;
        settle().await;
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mount_churn_leaves_no_timers() {
        let fetcher = Arc::new(GatedFetcher::default());
        let cache = cache(&fetcher);
        let identity = QueryIdentity::new(Endpoint::Status);

        for _ in 0..50 {
            let (handle, _rx) = cache.subscribe(DataRequest::Status).await.unwrap();
            cache.unsubscribe(&handle).await;
        }
        assert_eq!(cache.stats().await.active_polls, 0);

        // a receiver dropped without unsubscribing is pruned on the next tick
        let (_handle, rx) = cache.subscribe(DataRequest::Status).await.unwrap();
        drop(rx);
        assert!(cache.is_polling(&identity));
        tokio::time::advance(Duration::from_secs(5)).await;
        settle().await;
        assert_eq!(cache.stats().await.active_polls, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_rejects_new_subscribers() {
        let fetcher = Arc::new(GatedFetcher::default());
        let cache = cache(&fetcher);
        let (_h, _rx) = cache.subscribe(DataRequest::Status).await.unwrap();
        assert!(cache.is_polling(&QueryIdentity::new(Endpoint::Status)));

        cache.shutdown().await;
        assert!(!cache.is_polling(&QueryIdentity::new(Endpoint::Status)));
        assert!(cache.subscribe(DataRequest::Status).await.is_err());
    }
}
