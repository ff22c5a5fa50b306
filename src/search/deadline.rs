//! Per-invocation time budget and cooperative cancellation.

use crate::error::SearchError;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// How often (in matches) long pattern scans consult the deadline.
pub(crate) const CHECK_INTERVAL: usize = 256;

/// A wall-clock budget plus an optional caller-held cancellation token.
///
/// Checked between versions and periodically between pattern matches, so a
/// pathological pattern cannot hold a worker past its budget.
#[derive(Debug, Clone)]
pub struct Deadline {
    started: Instant,
    limit: Duration,
    cancel: CancellationToken,
}

impl Deadline {
    pub fn new(limit: Duration, cancel: CancellationToken) -> Self {
        Self {
            started: Instant::now(),
            limit,
            cancel,
        }
    }

    pub fn check(&self) -> Result<(), SearchError> {
        if self.cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }
        if self.started.elapsed() > self.limit {
            return Err(SearchError::SearchTimeout { limit: self.limit });
        }
        Ok(())
    }

    /// A fresh budget of the same length sharing this deadline's cancellation token.
    pub fn restart(&self) -> Self {
        Self::new(self.limit, self.cancel.clone())
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }
}
