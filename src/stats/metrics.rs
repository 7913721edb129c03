//! Counters for survey callers and dispatchers
//!
//! Counters are updated lock-free while surveys run and read back as plain
//! snapshot structs.

use std::sync::atomic::{AtomicU64, Ordering};

/// Caller-side statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurveyStats {
    /// Surveys issued
    pub calls: u64,
    /// Surveys that ended in an error
    pub failed_calls: u64,
    /// Node replies received across all surveys
    pub replies: u64,
}

impl SurveyStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Surveys that produced an aggregate
    pub fn succeeded_calls(&self) -> u64 {
        self.calls.saturating_sub(self.failed_calls)
    }
}

/// Dispatcher-side statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Survey requests answered
    pub handled: u64,
    /// Requests answered with a failure code
    pub failed: u64,
    /// Requests naming an operation with no handler
    pub unknown_ops: u64,
}

impl DispatchStats {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Default)]
pub(crate) struct SurveyCounters {
    calls: AtomicU64,
    failed_calls: AtomicU64,
    replies: AtomicU64,
}

impl SurveyCounters {
    pub(crate) fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.failed_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_replies(&self, n: usize) {
        self.replies.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> SurveyStats {
        SurveyStats {
            calls: self.calls.load(Ordering::Relaxed),
            failed_calls: self.failed_calls.load(Ordering::Relaxed),
            replies: self.replies.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct DispatchCounters {
    handled: AtomicU64,
    failed: AtomicU64,
    unknown_ops: AtomicU64,
}

impl DispatchCounters {
    pub(crate) fn record_handled(&self) {
        self.handled.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_unknown(&self) {
        self.unknown_ops.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> DispatchStats {
        DispatchStats {
            handled: self.handled.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            unknown_ops: self.unknown_ops.load(Ordering::Relaxed),
        }
    }
}
