//! Advisory in-progress flag shared between an orchestrator and its consumer.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Advisory flag raised for the duration of an operation.
///
/// The flag does not prevent overlapping operations; it only lets a consumer
/// observe that one is running.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag until the returned guard is dropped.
    pub fn enter(&self) -> BusyGuard {
        self.0.store(true, Ordering::SeqCst);
        BusyGuard(Arc::clone(&self.0))
    }

    #[inline]
    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Clears its [`BusyFlag`] on drop, including on early return and unwinding.
#[derive(Debug)]
#[must_use = "the flag is cleared as soon as the guard is dropped"]
pub struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
