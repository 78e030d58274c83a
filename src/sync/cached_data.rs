use super::fetcher::FetchResult;
use super::identity::QueryIdentity;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// Immutable snapshot of one cached query.
///
/// Every transition builds a new snapshot; the cache swaps the `Arc` it hands
/// out, so subscribers never observe a half-applied update.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub identity: QueryIdentity,
    pub data: Option<FetchResult>,
    pub status: FetchStatus,
    pub error: Option<String>,
    pub last_updated: DateTime<Utc>,
    /// Sequence number of the request in flight, if any
    pub in_flight: Option<u64>,
    pub stale: bool,
    pub version: u64,
    fetched_at: Option<Instant>,
}

/// What a view should render for an entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DisplayState<'a> {
    /// Nothing fetched yet
    Loading,
    /// Nothing fetched yet and the last attempt failed
    Failed(&'a str),
    Ready {
        data: &'a FetchResult,
        refreshing: bool,
        error: Option<&'a str>,
    },
}

impl CacheEntry {
    #[must_use]
    pub fn new(identity: QueryIdentity) -> Self {
        Self {
            identity,
            data: None,
            status: FetchStatus::Idle,
            error: None,
            last_updated: Utc::now(),
            in_flight: None,
            stale: false,
            version: 0,
            fetched_at: None,
        }
    }

    #[must_use]
    pub fn begin_fetch(&self, seq: u64) -> Self {
        let mut next = self.next();
        next.status = FetchStatus::Loading;
        next.in_flight = Some(seq);
        next.stale = true;
        next
    }

    #[must_use]
    pub fn complete(&self, data: FetchResult) -> Self {
        let mut next = self.next();
        next.data = Some(data);
        next.status = FetchStatus::Success;
        next.error = None;
        next.in_flight = None;
        next.stale = false;
        next.fetched_at = Some(Instant::now());
        next
    }

    /// Keeps whatever data was there before
    #[must_use]
    pub fn fail(&self, error: String) -> Self {
        let mut next = self.next();
        next.status = FetchStatus::Error;
        next.error = Some(error);
        next.in_flight = None;
        next.stale = true;
        next
    }

    /// The in-flight response was discarded and nothing replaces it
    #[must_use]
    pub fn abandon(&self) -> Self {
        let mut next = self.next();
        next.in_flight = None;
        next.status = if next.error.is_some() {
            FetchStatus::Error
        } else if next.data.is_some() {
            FetchStatus::Success
        } else {
            FetchStatus::Idle
        };
        next
    }

    #[must_use]
    pub fn mark_stale(&self) -> Self {
        let mut next = self.next();
        next.stale = true;
        next
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Stale when invalidated, never fetched, or older than `stale_after`
    #[must_use]
    pub fn is_stale(&self, stale_after: Duration) -> bool {
        self.stale
            || self
                .fetched_at
                .is_none_or(|fetched| fetched.elapsed() >= stale_after)
    }

    #[must_use]
    pub fn display_state(&self) -> DisplayState<'_> {
        match (&self.data, &self.error) {
            (Some(data), error) => DisplayState::Ready {
                data,
                refreshing: self.is_loading(),
                error: error.as_deref(),
            },
            (None, Some(error)) if !self.is_loading() => DisplayState::Failed(error),
            (None, _) => DisplayState::Loading,
        }
    }

    fn next(&self) -> Self {
        let mut next = self.clone();
        next.version += 1;
        next.last_updated = Utc::now();
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Status;
    use crate::sync::identity::Endpoint;

    fn status(running: bool) -> FetchResult {
        FetchResult::Status(Status {
            worker_running: running,
            ..Status::default()
        })
    }

    fn entry() -> CacheEntry {
        CacheEntry::new(QueryIdentity::new(Endpoint::Status))
    }

    #[test]
    fn test_status_transitions() {
        let idle = entry();
        assert_eq!(idle.status, FetchStatus::Idle);
        assert_eq!(idle.display_state(), DisplayState::Loading);

        let loading = idle.begin_fetch(1);
        assert_eq!(loading.status, FetchStatus::Loading);
        assert_eq!(loading.in_flight, Some(1));

        let done = loading.complete(status(true));
        assert_eq!(done.status, FetchStatus::Success);
        assert!(done.in_flight.is_none());
        assert!(!done.stale);
        assert!(done.version > loading.version);
    }

    #[test]
    fn test_failure_keeps_previous_data() {
        let done = entry().begin_fetch(1).complete(status(true));
        let failed = done
            .begin_fetch(2)
            .fail("timeout of 10000ms exceeded".to_string());

        assert_eq!(failed.status, FetchStatus::Error);
        assert_eq!(failed.data, Some(status(true)));
        match failed.display_state() {
            DisplayState::Ready {
                refreshing, error, ..
            } => {
                assert!(!refreshing);
                assert_eq!(error, Some("timeout of 10000ms exceeded"));
            }
            other => panic!("unexpected display state {other:?}"),
        }
    }

    #[test]
    fn test_failure_without_data_is_failed_state() {
        let failed = entry().begin_fetch(1).fail("Network Error".to_string());
        assert_eq!(failed.display_state(), DisplayState::Failed("Network Error"));

        // a retry in flight shows loading again
        let retry = failed.begin_fetch(2);
        assert_eq!(retry.display_state(), DisplayState::Loading);
    }

    #[test]
    fn test_refreshing_flag() {
        let done = entry().begin_fetch(1).complete(status(false));
        let refreshing = done.begin_fetch(2);
        assert!(matches!(
            refreshing.display_state(),
            DisplayState::Ready {
                refreshing: true,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_staleness_by_age_and_flag() {
        let done = entry().begin_fetch(1).complete(status(true));
        assert!(!done.is_stale(Duration::from_secs(3)));

        tokio::time::advance(Duration::from_secs(3)).await;
        assert!(done.is_stale(Duration::from_secs(3)));

        let fresh = entry().begin_fetch(1).complete(status(true));
        assert!(fresh.mark_stale().is_stale(Duration::from_secs(3)));
        assert!(entry().is_stale(Duration::from_secs(3)));
    }

    #[test]
    fn test_abandon_restores_settled_status() {
        let done = entry().begin_fetch(1).complete(status(true));
        let abandoned = done.begin_fetch(2).abandon();
        assert_eq!(abandoned.status, FetchStatus::Success);
        assert!(abandoned.in_flight.is_none());
        assert!(abandoned.stale);
    }
}
