//! Concurrency governor and backpressure gate
//!
//! Tracks the number of batches in flight and drives the [`FlowGate`]: when
//! dispatch pushes the active count past the cap, row intake is paused;
//! every completed batch resumes it. This is the sole flow-control
//! mechanism. There is no queue depth limit beyond batches in flight, no
//! per-batch timeout, and no cancellation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::flow::FlowGate;

pub struct BatchGovernor {
    active: AtomicUsize,
    cap: usize,
    gate: Arc<FlowGate>,
}

impl BatchGovernor {
    pub fn new(cap: usize, gate: Arc<FlowGate>) -> Self {
        Self {
            active: AtomicUsize::new(0),
            cap,
            gate,
        }
    }

    /// Register a dispatched batch.
    ///
    /// The comparison is deliberately `active > cap`: the cap is a soft
    /// throttle on future intake, so cap + 1 batches may be in flight
    /// before the source pauses. The current batch is always dispatched;
    /// nothing is dropped; memory stays bounded because intake stops.
    pub fn on_dispatch(&self) {
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        if active > self.cap {
            self.gate.pause();
        }
    }

    /// Register a completed batch (success or failure) and resume intake
    /// if the source is currently paused.
    pub fn on_complete(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
        if self.gate.is_paused() {
            self.gate.resume();
        }
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}
