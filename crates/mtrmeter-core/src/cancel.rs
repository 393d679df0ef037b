use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A request to stop accumulating.
///
/// The accumulator only observes the request between probes, a probe which
/// is already running completes (or times out) first.
///
/// Note that this type is cheaply cloneable, all clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    cancelled: Arc<AtomicBool>,
}

impl Cancellation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Has cancellation been requested?
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
