use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub kind: NotificationKind,
    pub created_at: Instant,
    pub ttl: Duration,
}

impl Notification {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }
}

#[derive(Debug, Default)]
struct Board {
    next_id: u64,
    active: Vec<Notification>,
    timers: HashMap<u64, CancellationToken>,
}

/// Short-lived success/error messages, each removed by its own expiry timer
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    board: Arc<Mutex<Board>>,
    default_ttl: Duration,
}

impl NotificationCenter {
    #[must_use]
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            board: Arc::new(Mutex::new(Board::default())),
            default_ttl,
        }
    }

    fn board(&self) -> MutexGuard<'_, Board> {
        self.board.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.push(NotificationKind::Success, message)
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.push(NotificationKind::Error, message)
    }

    pub fn push(&self, kind: NotificationKind, message: impl Into<String>) -> u64 {
        self.push_with_ttl(kind, message, self.default_ttl)
    }

    pub fn push_with_ttl(
        &self,
        kind: NotificationKind,
        message: impl Into<String>,
        ttl: Duration,
    ) -> u64 {
        let token = CancellationToken::new();
        let id = {
            let mut board = self.board();
            board.next_id += 1;
            let id = board.next_id;
            board.active.push(Notification {
                id,
                message: message.into(),
                kind,
                created_at: Instant::now(),
                ttl,
            });
            board.timers.insert(id, token.clone());
            id
        };
        debug!("🔔 Notification #{} ({:?}, {}ms)", id, kind, ttl.as_millis());

        let board = Arc::clone(&self.board);
        tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => {}
                () = sleep(ttl) => {
                    let mut board = board.lock().unwrap_or_else(PoisonError::into_inner);
                    board.active.retain(|n| n.id != id);
                    board.timers.remove(&id);
                }
            }
        });
        id
    }

    /// Removes a notification before it expires; false if it is already gone
    pub fn dismiss(&self, id: u64) -> bool {
        let mut board = self.board();
        if let Some(token) = board.timers.remove(&id) {
            token.cancel();
        }
        let before = board.active.len();
        board.active.retain(|n| n.id != id);
        board.active.len() != before
    }

    /// Unexpired notifications, oldest first
    #[must_use]
    pub fn active(&self) -> Vec<Notification> {
        self.board()
            .active
            .iter()
            .filter(|n| !n.is_expired())
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn latest(&self) -> Option<Notification> {
        self.active().pop()
    }

    pub fn clear(&self) {
        let mut board = self.board();
        for (_, token) in board.timers.drain() {
            token.cancel();
        }
        board.active.clear();
    }

    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.board().timers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_expires_after_ttl() {
        let center = NotificationCenter::new(Duration::from_millis(3000));
        center.success("Configuration saved");
        assert_eq!(center.active().len(), 1);

        tokio::time::advance(Duration::from_millis(2999)).await;
        settle().await;
        assert_eq!(center.active().len(), 1);

        tokio::time::advance(Duration::from_millis(2)).await;
        settle().await;
        assert!(center.active().is_empty());
        assert_eq!(center.pending_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_cancels_timer() {
        let center = NotificationCenter::new(Duration::from_millis(3000));
        let id = center.error("MQTT Broker connection test failed: ECONNREFUSED");
        assert_eq!(center.pending_timers(), 1);

        assert!(center.dismiss(id));
        assert_eq!(center.pending_timers(), 0);
        assert!(center.active().is_empty());

        // already gone: no panic, just false
        assert!(!center.dismiss(id));
        tokio::time::advance(Duration::from_secs(5)).await;
        settle().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_latest_and_custom_ttl() {
        let center = NotificationCenter::new(Duration::from_millis(3000));
        center.success("Worker started");
        center.push_with_ttl(NotificationKind::Error, "short", Duration::from_millis(500));

        let latest = center.latest().unwrap();
        assert_eq!(latest.message, "short");
        assert_eq!(latest.kind, NotificationKind::Error);

        tokio::time::advance(Duration::from_millis(600)).await;
        settle().await;
        assert_eq!(center.latest().unwrap().message, "Worker started");

        center.clear();
        assert!(center.active().is_empty());
        assert_eq!(center.pending_timers(), 0);
    }
}
