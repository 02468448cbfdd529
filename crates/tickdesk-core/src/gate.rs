//! Mutual-exclusion flag for the manual reorder gesture.
//!
//! While the gate is held, network issuance is refused and the auto-refresh
//! scheduler pauses. The guard clears the flag on drop, so the flag cannot
//! stay set after an abnormal end of the gesture.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared suspension flag, cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct ReorderGate {
    active: Arc<AtomicBool>,
}

impl ReorderGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a reorder gesture is currently in progress.
    pub fn is_suspended(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Enter the exclusive reorder state. The returned guard clears the
    /// flag when dropped.
    #[must_use]
    pub fn begin(&self) -> ReorderGuard {
        self.active.store(true, Ordering::Release);
        ReorderGuard { gate: self.clone() }
    }
}

/// RAII guard for the reorder state.
#[derive(Debug)]
pub struct ReorderGuard {
    gate: ReorderGate,
}

impl Drop for ReorderGuard {
    fn drop(&mut self) {
        self.gate.active.store(false, Ordering::Release);
    }
}
