/**
 * Configuration constants for the query cache, poller and notifications
 */
use std::time::Duration;

/// Client-side ceiling for one request in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Lifetime of a transient notification in milliseconds
pub const DEFAULT_NOTIFICATION_TTL_MS: u64 = 3000;

/// Entries retained once nobody subscribes to them any more
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// Poll intervals (milliseconds)
pub const STATUS_POLL_MS: u64 = 5000;
pub const LOGS_POLL_MS: u64 = 3000;
pub const EVENTS_POLL_MS: u64 = 5000;

/// Age after which an entry is refetched on subscription (milliseconds)
pub const STATUS_STALE_MS: u64 = 3000;
pub const LOGS_STALE_MS: u64 = 2000;
pub const EVENTS_STALE_MS: u64 = 4000;
pub const CONFIG_STALE_MS: u64 = 300_000; // 5 minutes

/// Page sizes a list view may request
pub const PAGE_SIZES: [u32; 4] = [25, 50, 100, 200];
pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const DEFAULT_LOGS_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Fetches and mutations that take longer fail with a timeout error
    pub request_timeout: Duration,
    pub notification_ttl: Duration,
    pub cache_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            notification_ttl: Duration::from_millis(DEFAULT_NOTIFICATION_TTL_MS),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

const fn contains(sizes: &[u32], size: u32) -> bool {
    let mut i = 0;
    while i < sizes.len() {
        if sizes[i] == size {
            return true;
        }
        i += 1;
    }
    false
}

/// Validate configuration constants at compile time
const _: () = {
    assert!(DEFAULT_REQUEST_TIMEOUT_SECS > 0, "DEFAULT_REQUEST_TIMEOUT_SECS must be greater than 0");
    assert!(DEFAULT_NOTIFICATION_TTL_MS > 0, "DEFAULT_NOTIFICATION_TTL_MS must be greater than 0");
    assert!(DEFAULT_CACHE_CAPACITY > 0, "DEFAULT_CACHE_CAPACITY must be greater than 0");
    assert!(STATUS_STALE_MS < STATUS_POLL_MS, "status must go stale before its next poll");
    assert!(LOGS_STALE_MS < LOGS_POLL_MS, "logs must go stale before their next poll");
    assert!(EVENTS_STALE_MS < EVENTS_POLL_MS, "events must go stale before their next poll");
    assert!(contains(&PAGE_SIZES, DEFAULT_PAGE_SIZE), "DEFAULT_PAGE_SIZE must be an allowed size");
    assert!(contains(&PAGE_SIZES, DEFAULT_LOGS_PAGE_SIZE), "DEFAULT_LOGS_PAGE_SIZE must be an allowed size");
};
