use super::identity::QueryIdentity;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Called on every tick with the identity being polled
pub type PollTick = Arc<dyn Fn(QueryIdentity) -> BoxFuture<'static, ()> + Send + Sync>;

#[derive(Debug)]
struct PollRegistration {
    token: CancellationToken,
    _task: JoinHandle<()>,
}

/// One timer per identity, each on its own task so a slow tick never delays another identity
#[derive(Debug, Default)]
pub struct PollingScheduler {
    registrations: Mutex<HashMap<QueryIdentity, PollRegistration>>,
}

impl PollingScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn registrations(&self) -> MutexGuard<'_, HashMap<QueryIdentity, PollRegistration>> {
        self.registrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts a timer for `identity`, or keeps the running one.
    ///
    /// Returns true when a new timer was started. The first tick fires one
    /// interval after registration.
    pub fn register(&self, identity: QueryIdentity, interval: Duration, tick: PollTick) -> bool {
        let mut registrations = self.registrations();
        if registrations.contains_key(&identity) {
            debug!("⏱️  Poll REUSE: {}", identity);
            return false;
        }

        let token = CancellationToken::new();
        let task = tokio::spawn(run_timer(identity.clone(), interval, token.clone(), tick));
        debug!("⏱️  Poll START: {} every {}ms", identity, interval.as_millis());
        registrations.insert(
            identity,
            PollRegistration {
                token,
                _task: task,
            },
        );
        true
    }

    /// Stops the timer; false when none was registered
    pub fn cancel(&self, identity: &QueryIdentity) -> bool {
        self.registrations().remove(identity).is_some_and(|registration| {
            registration.token.cancel();
            debug!("⏹️  Poll STOP: {}", identity);
            true
        })
    }

    pub fn cancel_all(&self) {
        let mut registrations = self.registrations();
        for (_, registration) in registrations.drain() {
            registration.token.cancel();
        }
    }

    #[must_use]
    pub fn is_registered(&self, identity: &QueryIdentity) -> bool {
        self.registrations().contains_key(identity)
    }

    /// Number of live timers
    #[must_use]
    pub fn active(&self) -> usize {
        self.registrations().len()
    }
}

impl Drop for PollingScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

async fn run_timer(
    identity: QueryIdentity,
    interval: Duration,
    token: CancellationToken,
    tick: PollTick,
) {
    let mut ticker = interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = token.cancelled() => break,
            _ = ticker.tick() => {
                tick(identity.clone()).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::identity::Endpoint;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_tick(counter: Arc<AtomicUsize>) -> PollTick {
        Arc::new(move |_identity| {
            let counter = Arc::clone(&counter);
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
        })
    }

    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_at_interval() {
        let scheduler = PollingScheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let identity = QueryIdentity::new(Endpoint::Status);

        assert!(scheduler.register(
            identity.clone(),
            Duration::from_secs(5),
            counting_tick(counter.clone())
        ));
        settle().await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        tokio::time::advance(Duration::from_secs(5)).await;
        settle().await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(5)).await;
        settle().await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_register_reuses_existing_timer() {
        let scheduler = PollingScheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let identity = QueryIdentity::new(Endpoint::Status);

        assert!(scheduler.register(
            identity.clone(),
            Duration::from_secs(5),
            counting_tick(counter.clone())
        ));
        assert!(!scheduler.register(
            identity.clone(),
            Duration::from_secs(5),
            counting_tick(counter.clone())
        ));
        assert_eq!(scheduler.active(), 1);

        tokio::time::advance(Duration::from_secs(5)).await;
        settle().await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_ticks() {
        let scheduler = PollingScheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let identity = QueryIdentity::new(Endpoint::Logs);

        scheduler.register(
            identity.clone(),
            Duration::from_secs(3),
            counting_tick(counter.clone()),
        );
        assert!(scheduler.cancel(&identity));
        assert!(!scheduler.cancel(&identity));
        assert!(!scheduler.is_registered(&identity));

        tokio::time::advance(Duration::from_secs(10)).await;
        settle().await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_identities_tick_independently() {
        let scheduler = PollingScheduler::new();
        let status_ticks = Arc::new(AtomicUsize::new(0));
        let logs_ticks = Arc::new(AtomicUsize::new(0));

        scheduler.register(
            QueryIdentity::new(Endpoint::Status),
            Duration::from_secs(5),
            counting_tick(status_ticks.clone()),
        );
        scheduler.register(
            QueryIdentity::new(Endpoint::Logs),
            Duration::from_secs(3),
            counting_tick(logs_ticks.clone()),
        );

        for _ in 0..15 {
            tokio::time::advance(Duration::from_secs(1)).await;
            settle().await;
        }
        assert_eq!(status_ticks.load(Ordering::SeqCst), 3);
        assert_eq!(logs_ticks.load(Ordering::SeqCst), 5);
        assert_eq!(scheduler.active(), 2);
    }
}
