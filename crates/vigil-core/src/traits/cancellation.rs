//! Cooperative cancellation for monitor-test lifecycles.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Checked between lifecycle stages and inside long-running collectors.
pub trait Cancellable {
    fn is_cancelled(&self) -> bool;

    fn cancel(&self);
}

/// Clonable token; every clone observes the same cancellation.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Cancellable for CancellationToken {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::AcqRel) {
            tracing::info!(event = "cancellation_requested", "run cancellation requested");
        }
    }
}
