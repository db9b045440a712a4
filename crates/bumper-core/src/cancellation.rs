//! Cooperative cancellation for upgrade runs.
//! Wraps an `Arc<AtomicBool>` plus an optional run-wide deadline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::errors::{UpgradeError, UpgradeResult};

/// Cancellation handle shared between the caller and every upgrader.
///
/// Cloning is cheap; all clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that also reports cancellation once `timeout` has elapsed.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    /// Request cancellation. Work already written to disk is left intact.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Return `Err(UpgradeError::Cancelled)` if cancellation was requested.
    pub fn check(&self) -> UpgradeResult<()> {
        if self.is_cancelled() {
            Err(UpgradeError::Cancelled)
        } else {
            Ok(())
        }
    }
}
