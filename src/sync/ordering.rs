/// What to do with a settled response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyDecision {
    Apply,
    /// A newer request already applied its result
    DropSuperseded,
    /// Issued before an invalidation, so it may carry pre-mutation state
    DropInvalidated,
}

/// Per-identity request counter.
///
/// Sequence numbers are issued in order; a response is applied only if it is
/// newer than the last applied one and was issued after the last invalidation
/// that happened while it was in flight.
#[derive(Debug, Default, Clone)]
pub struct RequestSequencer {
    last_issued: u64,
    last_applied: u64,
    accept_from: u64,
}

impl RequestSequencer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_issued: 0,
            last_applied: 0,
            accept_from: 0,
        }
    }

    pub const fn issue(&mut self) -> u64 {
        self.last_issued += 1;
        self.last_issued
    }

    pub const fn classify(&mut self, seq: u64) -> ApplyDecision {
        if seq < self.accept_from {
            return ApplyDecision::DropInvalidated;
        }
        if seq <= self.last_applied {
            return ApplyDecision::DropSuperseded;
        }
        self.last_applied = seq;
        ApplyDecision::Apply
    }

    /// Reject every response issued so far
    pub const fn invalidate_issued(&mut self) {
        self.accept_from = self.last_issued + 1;
    }

    #[must_use]
    pub const fn last_issued(&self) -> u64 {
        self.last_issued
    }

    #[must_use]
    pub const fn last_applied(&self) -> u64 {
        self.last_applied
    }
}
