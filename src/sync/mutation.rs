use super::data_cache::QueryCache;
use super::errors::invalid_transition_error;
use super::fetcher::Fetcher;
use super::identity::{Endpoint, QueryIdentity};
use super::notification::NotificationCenter;
use crate::api::{ActionReply, AdminConfig, ApiError, BatchDelete, ConnectionTest, Event, Integration};
use crate::error::Result;
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

/// Proof that the operator confirmed a destructive action.
///
/// Only a view that actually asked should build one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmed(());

impl Confirmed {
    #[must_use]
    pub const fn by_operator() -> Self {
        Self(())
    }
}

/// Write operations against the admin api
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    StartWorker,
    StopWorker,
    ResetWatermark(Confirmed),
    SaveConfig(Box<AdminConfig>),
    TestConnection(Integration),
    DeleteEvent {
        id: String,
        confirmed: Confirmed,
    },
    DeleteEventsBatch {
        filter: BatchDelete,
        confirmed: Confirmed,
    },
    UpdateEvent {
        id: String,
        changes: serde_json::Map<String, serde_json::Value>,
    },
}

/// At most one mutation per kind is pending; probes are keyed per integration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    StartWorker,
    StopWorker,
    ResetWatermark,
    SaveConfig,
    TestConnection(Integration),
    DeleteEvent,
    DeleteEventsBatch,
    UpdateEvent,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartWorker => f.write_str("start-worker"),
            Self::StopWorker => f.write_str("stop-worker"),
            Self::ResetWatermark => f.write_str("reset-watermark"),
            Self::SaveConfig => f.write_str("save-config"),
            Self::TestConnection(integration) => write!(f, "test-connection:{integration}"),
            Self::DeleteEvent => f.write_str("delete-event"),
            Self::DeleteEventsBatch => f.write_str("delete-events-batch"),
            Self::UpdateEvent => f.write_str("update-event"),
        }
    }
}

/// Cache entries a successful mutation makes stale
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
    Exact(QueryIdentity),
    /// Every cached identity of the endpoint, whatever its page or filters
    Endpoint(Endpoint),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MutationReply {
    Action(ActionReply),
    Probe(ConnectionTest),
    Event(Box<Event>),
    Deleted(u64),
    Removed,
}

impl Mutation {
    #[must_use]
    pub const fn kind(&self) -> MutationKind {
        match self {
            Self::StartWorker => MutationKind::StartWorker,
            Self::StopWorker => MutationKind::StopWorker,
            Self::ResetWatermark(_) => MutationKind::ResetWatermark,
            Self::SaveConfig(_) => MutationKind::SaveConfig,
            Self::TestConnection(integration) => MutationKind::TestConnection(*integration),
            Self::DeleteEvent { .. } => MutationKind::DeleteEvent,
            Self::DeleteEventsBatch { .. } => MutationKind::DeleteEventsBatch,
            Self::UpdateEvent { .. } => MutationKind::UpdateEvent,
        }
    }

    #[must_use]
    pub fn affected(&self) -> Vec<Invalidation> {
        match self {
            Self::StartWorker | Self::StopWorker | Self::ResetWatermark(_) => {
                vec![Invalidation::Exact(QueryIdentity::new(Endpoint::Status))]
            }
            Self::SaveConfig(_) => vec![Invalidation::Exact(QueryIdentity::new(Endpoint::Config))],
            Self::TestConnection(_) => vec![],
            Self::DeleteEvent { .. } | Self::DeleteEventsBatch { .. } | Self::UpdateEvent { .. } => {
                vec![Invalidation::Endpoint(Endpoint::Events)]
            }
        }
    }

    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::StartWorker => "Start worker".to_string(),
            Self::StopWorker => "Stop worker".to_string(),
            Self::ResetWatermark(_) => "Reset watermark".to_string(),
            Self::SaveConfig(_) => "Save configuration".to_string(),
            Self::TestConnection(integration) => {
                format!("{} connection test", integration.label())
            }
            Self::DeleteEvent { .. } => "Delete event".to_string(),
            Self::DeleteEventsBatch { .. } => "Batch delete".to_string(),
            Self::UpdateEvent { .. } => "Update event".to_string(),
        }
    }

    fn success_message(&self, reply: &MutationReply) -> String {
        match (self, reply) {
            (Self::StartWorker, MutationReply::Action(a)) if a.status == "already_running" => {
                "Worker already running".to_string()
            }
            (Self::StartWorker, _) => "Worker started".to_string(),
            (Self::StopWorker, _) => "Worker stopped".to_string(),
            (Self::ResetWatermark(_), _) => "Watermark reset".to_string(),
            (Self::SaveConfig(_), _) => "Configuration saved".to_string(),
            (Self::TestConnection(integration), _) => {
                format!("{} connection OK", integration.label())
            }
            (Self::DeleteEvent { .. }, _) => "Event deleted".to_string(),
            (Self::DeleteEventsBatch { .. }, MutationReply::Deleted(count)) => {
                format!("Deleted {count} events")
            }
            (Self::DeleteEventsBatch { .. }, _) => "Events deleted".to_string(),
            (Self::UpdateEvent { .. }, _) => "Event updated".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationPhase {
    Idle,
    Pending,
    Succeeded,
    Failed,
}

/// Single-shot request: idle -> pending -> succeeded | failed.
/// Retrying means building a new request.
#[derive(Debug, Clone)]
pub struct MutationRequest {
    pub mutation: Mutation,
    pub affected: Vec<Invalidation>,
    phase: MutationPhase,
}

impl MutationRequest {
    #[must_use]
    pub fn new(mutation: Mutation) -> Self {
        let affected = mutation.affected();
        Self {
            mutation,
            affected,
            phase: MutationPhase::Idle,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> MutationPhase {
        self.phase
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self.phase, MutationPhase::Succeeded | MutationPhase::Failed)
    }

    /// # Errors
    ///
    /// Will return `Err` for any move other than idle to pending or pending to a terminal phase
    pub fn advance(&mut self, next: MutationPhase) -> Result<()> {
        use MutationPhase::{Failed, Idle, Pending, Succeeded};
        match (self.phase, next) {
            (Idle, Pending) | (Pending, Succeeded | Failed) => {
                self.phase = next;
                Ok(())
            }
            (from, to) => Err(invalid_transition_error(from, to)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    Succeeded {
        reply: MutationReply,
        invalidated: Vec<QueryIdentity>,
    },
    Failed {
        reason: String,
    },
    /// Same kind already pending
    Ignored,
}

impl MutationOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

type PendingSet = Arc<Mutex<HashSet<MutationKind>>>;

fn lock(pending: &PendingSet) -> MutexGuard<'_, HashSet<MutationKind>> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears the pending flag however `execute` ends, including cancellation
struct PendingGuard {
    pending: PendingSet,
    kind: MutationKind,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        lock(&self.pending).remove(&self.kind);
    }
}

/// Runs mutations, tracks which kinds are pending, invalidates on success
/// and reports every outcome as a notification
#[derive(Clone)]
pub struct MutationCoordinator {
    fetcher: Arc<dyn Fetcher>,
    cache: QueryCache,
    notifications: NotificationCenter,
    pending: PendingSet,
    request_timeout: Duration,
}

impl MutationCoordinator {
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        cache: QueryCache,
        notifications: NotificationCenter,
        request_timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            cache,
            notifications,
            pending: Arc::new(Mutex::new(HashSet::new())),
            request_timeout,
        }
    }

    #[must_use]
    pub fn is_pending(&self, kind: MutationKind) -> bool {
        lock(&self.pending).contains(&kind)
    }

    #[must_use]
    pub fn pending(&self) -> Vec<MutationKind> {
        lock(&self.pending).iter().copied().collect()
    }

    fn try_begin(&self, kind: MutationKind) -> Option<PendingGuard> {
        if !lock(&self.pending).insert(kind) {
            return None;
        }
        Some(PendingGuard {
            pending: Arc::clone(&self.pending),
            kind,
        })
    }

    pub async fn execute(&self, mutation: Mutation) -> MutationOutcome {
        let mut request = MutationRequest::new(mutation);
        let kind = request.mutation.kind();
        let Some(_guard) = self.try_begin(kind) else {
            info!("⏸️  MUTATION IGNORED: {} already pending", kind);
            return MutationOutcome::Ignored;
        };
        if let Err(e) = request.advance(MutationPhase::Pending) {
            return self.fail(&request, e.reason());
        }

        info!("✏️  MUTATION START: {}", kind);
        let result = match timeout(self.request_timeout, self.fetcher.execute(&request.mutation)).await {
            Ok(result) => result,
            Err(_) => Err(ApiError::Timeout(self.request_timeout).into()),
        };

        match result {
            Ok(reply) => {
                if let Err(e) = request.advance(MutationPhase::Succeeded) {
                    warn!("⚠️  MUTATION STATE: {}: {}", kind, e);
                }
                let invalidated = self.invalidate(&request.affected).await;
                info!("✅ MUTATION OK: {} (invalidated {})", kind, invalidated.len());
                self.notifications
                    .success(request.mutation.success_message(&reply));
                MutationOutcome::Succeeded { reply, invalidated }
            }
            Err(e) => {
                if let Err(transition) = request.advance(MutationPhase::Failed) {
                    warn!("⚠️  MUTATION STATE: {}: {}", kind, transition);
                }
                self.fail(&request, e.reason())
            }
        }
    }

    /// Every failure ends here so none goes unreported
    fn fail(&self, request: &MutationRequest, reason: String) -> MutationOutcome {
        warn!("❌ MUTATION FAILED: {}: {}", request.mutation.kind(), reason);
        self.notifications
            .error(format!("{} failed: {reason}", request.mutation.label()));
        MutationOutcome::Failed { reason }
    }

    async fn invalidate(&self, affected: &[Invalidation]) -> Vec<QueryIdentity> {
        let mut invalidated = Vec::new();
        for target in affected {
            match target {
                Invalidation::Exact(identity) => {
                    if self.cache.invalidate(identity).await {
                        invalidated.push(identity.clone());
                    }
                }
                Invalidation::Endpoint(endpoint) => {
                    invalidated.extend(self.cache.invalidate_endpoint(*endpoint).await);
                }
            }
        }
        invalidated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::sync::notification::NotificationKind;
    use crate::sync::SyncConfig;
    use crate::tui::test_support::ctx;

    #[test]
    fn test_affected_identities_per_kind() {
        let status = Invalidation::Exact(QueryIdentity::new(Endpoint::Status));
        assert_eq!(Mutation::StartWorker.affected(), vec![status.clone()]);
        assert_eq!(
            Mutation::ResetWatermark(Confirmed::by_operator()).affected(),
            vec![status]
        );
        assert_eq!(
            Mutation::SaveConfig(Box::default()).affected(),
            vec![Invalidation::Exact(QueryIdentity::new(Endpoint::Config))]
        );
        assert!(Mutation::TestConnection(Integration::Mqtt).affected().is_empty());
        assert_eq!(
            Mutation::DeleteEvent {
                id: "abc".to_string(),
                confirmed: Confirmed::by_operator()
            }
            .affected(),
            vec![Invalidation::Endpoint(Endpoint::Events)]
        );
    }

    #[test]
    fn test_probe_kinds_are_per_integration() {
        assert_ne!(
            Mutation::TestConnection(Integration::Mqtt).kind(),
            Mutation::TestConnection(Integration::MongoDb).kind()
        );
        assert_eq!(
            MutationKind::TestConnection(Integration::SqlServer).to_string(),
            "test-connection:sqlserver"
        );
    }

    #[test]
    fn test_request_state_machine() {
        let mut request = MutationRequest::new(Mutation::StopWorker);
        assert_eq!(request.phase(), MutationPhase::Idle);
        assert!(matches!(
            request.advance(MutationPhase::Succeeded),
            Err(Error::InvalidTransition { .. })
        ));

        request.advance(MutationPhase::Pending).unwrap();
        request.advance(MutationPhase::Failed).unwrap();
        assert!(request.is_terminal());

        // terminal requests are single-shot
        assert!(request.advance(MutationPhase::Pending).is_err());
        assert!(request.advance(MutationPhase::Succeeded).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_always_notified() {
        let ctx = ctx(&SyncConfig::default());
        let mut request = MutationRequest::new(Mutation::StopWorker);
        request.advance(MutationPhase::Pending).unwrap();
        let err = request.advance(MutationPhase::Pending).unwrap_err();

        let outcome = ctx.mutations.fail(&request, err.reason());
        assert!(matches!(outcome, MutationOutcome::Failed { ref reason } if reason.contains("Pending")));

        let active = ctx.notifications.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].kind, NotificationKind::Error);
        assert!(active[0].message.starts_with("Stop worker failed: "));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_mutation_notifies_and_clears_pending() {
        let ctx = ctx(&SyncConfig::default());
        let outcome = ctx.mutations.execute(Mutation::StartWorker).await;

        assert_eq!(
            outcome,
            MutationOutcome::Failed {
                reason: "offline".to_string()
            }
        );
        assert!(!ctx.mutations.is_pending(MutationKind::StartWorker));
        assert_eq!(
            ctx.notifications.active()[0].message,
            "Start worker failed: offline"
        );
    }

    #[test]
    fn test_success_messages() {
        let already = MutationReply::Action(ActionReply {
            status: "already_running".to_string(),
        });
        assert_eq!(
            Mutation::StartWorker.success_message(&already),
            "Worker already running"
        );
        let batch = Mutation::DeleteEventsBatch {
            filter: BatchDelete::default(),
            confirmed: Confirmed::by_operator(),
        };
        assert_eq!(
            batch.success_message(&MutationReply::Deleted(12)),
            "Deleted 12 events"
        );
    }
}
