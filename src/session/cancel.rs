//! Cooperative cancellation for the decision loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Token threaded through the decision loop.
///
/// Cancellation is cooperative and never preemptive: a set token only
/// prevents *future* remote calls — an in-flight request always runs to
/// its response. Clone is cheap and shares state.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}
