/**
 * Helper functions for creating common sync-layer error types
 */
use crate::error::Error;

/// Create a `ShutDown` error for a sync `component` used after `shutdown()`
#[must_use]
pub fn shut_down_error(component: &str) -> Error {
    Error::Lifecycle {
        reason: "ShutDown",
        message: format!("{component} has been shut down"),
    }
}

/// Create an `InvalidTransition` error for the mutation state machine
#[must_use]
pub fn invalid_transition_error(from: impl std::fmt::Debug, to: impl std::fmt::Debug) -> Error {
    Error::InvalidTransition {
        from: format!("{from:?}"),
        to: format!("{to:?}"),
    }
}
