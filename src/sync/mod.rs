pub mod cached_data;
pub mod config;
pub mod data_cache;
pub mod errors;
pub mod fetcher;
pub mod identity;
pub mod mutation;
pub mod notification;
pub mod ordering;
pub mod pagination;
pub mod polling;
pub mod subscription;

pub use cached_data::{CacheEntry, DisplayState, FetchStatus};
pub use config::SyncConfig;
pub use data_cache::{CacheStats, QueryCache};
pub use fetcher::{DataRequest, FetchResult, Fetcher};
pub use identity::{Endpoint, QueryIdentity};
pub use mutation::{
    Confirmed, Invalidation, Mutation, MutationCoordinator, MutationKind, MutationOutcome,
    MutationPhase, MutationReply, MutationRequest,
};
pub use notification::{Notification, NotificationCenter, NotificationKind};
pub use ordering::{ApplyDecision, RequestSequencer};
pub use pagination::{PageQuery, PaginationFilterState};
pub use polling::{PollTick, PollingScheduler};
pub use subscription::{EntryUpdates, SubscriptionHandle};
