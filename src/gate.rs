//! Single-slot gate keeping at most one full workflow run in flight.
//!
//! The check and the set are a single atomic compare-exchange, so two
//! concurrent callers cannot both pass. A second caller while a run is
//! active is rejected, not queued; there is no cancellation once a run
//! starts.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct WorkflowGate {
    running: AtomicBool,
}

impl WorkflowGate {
    pub const fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
        }
    }

    /// Claim the slot. Returns `None` when a workflow is already running;
    /// the returned guard releases the slot on drop.
    pub fn try_acquire(&self) -> Option<WorkflowGuard<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| WorkflowGuard { gate: self })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
pub struct WorkflowGuard<'a> {
    gate: &'a WorkflowGate,
}

impl Drop for WorkflowGuard<'_> {
    fn drop(&mut self) {
        self.gate.running.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_is_rejected_while_held() {
        let gate = WorkflowGate::new();
        let guard = gate.try_acquire();
        assert!(guard.is_some());
        assert!(gate.is_running());
        assert!(gate.try_acquire().is_none());
    }

    #[test]
    fn slot_frees_on_drop() {
        let gate = WorkflowGate::new();
        drop(gate.try_acquire());
        assert!(!gate.is_running());
        assert!(gate.try_acquire().is_some());
    }

    #[test]
    fn held_slot_blocks_all_other_threads() {
        use std::sync::Arc;

        let gate = Arc::new(WorkflowGate::new());
        let guard = gate.try_acquire().unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gate = Arc::clone(&gate);
                std::thread::spawn(move || gate.try_acquire().is_some())
            })
            .collect();
        for handle in handles {
            assert!(!handle.join().unwrap());
        }

        drop(guard);
        assert!(gate.try_acquire().is_some());
    }
}
