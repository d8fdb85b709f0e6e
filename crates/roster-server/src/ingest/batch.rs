//! Batch accumulation with adaptive sizing
//!
//! [`BatchPolicy`] is the sizing policy as an explicit state machine: the
//! first batch holds `initial` records, and every emitted batch doubles the
//! threshold for the next one up to `cap`. Early batches stay small so the
//! first failures surface quickly; long streams amortize per-batch overhead
//! at the cap. The policy keeps doubling regardless of batch failures.
//!
//! [`BatchAccumulator`] buffers validated records and emits a [`Batch`]
//! whenever the current threshold is reached. The trailing partial batch is
//! emitted by [`BatchAccumulator::flush`] at end of stream; no record is
//! ever dropped.

use super::types::{Batch, NormalizedRecord};

/// Sizing policy: threshold for the next batch, doubling per emitted batch
/// up to a cap.
#[derive(Debug, Clone)]
pub struct BatchPolicy {
    next_size: usize,
    cap: usize,
}

impl BatchPolicy {
    pub fn new(initial: usize, cap: usize) -> Self {
        Self {
            next_size: initial.max(1),
            cap: cap.max(1),
        }
    }

    /// Threshold for the batch currently being accumulated.
    pub fn threshold(&self) -> usize {
        self.next_size
    }

    /// Record that a batch was emitted: double the threshold, capped.
    pub fn advance(&mut self) {
        self.next_size = (self.next_size * 2).min(self.cap);
    }
}

/// Buffers normalized records into batches per the sizing policy.
#[derive(Debug)]
pub struct BatchAccumulator {
    policy: BatchPolicy,
    buffer: Vec<NormalizedRecord>,
    next_number: u64,
}

impl BatchAccumulator {
    pub fn new(policy: BatchPolicy) -> Self {
        Self {
            policy,
            buffer: Vec::new(),
            next_number: 0,
        }
    }

    /// Buffer a record; returns a full batch when the threshold is reached.
    pub fn push(&mut self, record: NormalizedRecord) -> Option<Batch> {
        self.buffer.push(record);
        if self.buffer.len() >= self.policy.threshold() {
            Some(self.emit())
        } else {
            None
        }
    }

    /// Emit whatever is buffered, if anything. Called at end of stream so
    /// the trailing partial batch (size 1 included) is still processed.
    pub fn flush(&mut self) -> Option<Batch> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(self.emit())
        }
    }

    fn emit(&mut self) -> Batch {
        let batch = Batch {
            number: self.next_number,
            records: std::mem::take(&mut self.buffer),
        };
        self.next_number += 1;
        self.policy.advance();
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn record(i: usize) -> NormalizedRecord {
        NormalizedRecord {
            group_id: Uuid::nil(),
            email: format!("user{}@example.com", i),
            name: format!("User {}", i),
            subscribed: true,
            fields: vec![],
        }
    }

    #[test]
    fn test_policy_doubles_to_cap() {
        let mut policy = BatchPolicy::new(10, 300);
        let mut sizes = Vec::new();
        for _ in 0..8 {
            sizes.push(policy.threshold());
            policy.advance();
        }
        assert_eq!(sizes, vec![10, 20, 40, 80, 160, 300, 300, 300]);
    }

    #[test]
    fn test_emits_at_threshold() {
        let mut acc = BatchAccumulator::new(BatchPolicy::new(3, 300));

        assert!(acc.push(record(0)).is_none());
        assert!(acc.push(record(1)).is_none());
        let batch = acc.push(record(2)).expect("third record fills the batch");
        assert_eq!(batch.number, 0);
        assert_eq!(batch.len(), 3);

        // Threshold doubled: the next batch needs 6 records.
        for i in 3..8 {
            assert!(acc.push(record(i)).is_none());
        }
        let batch = acc.push(record(8)).expect("sixth record fills batch 1");
        assert_eq!(batch.number, 1);
        assert_eq!(batch.len(), 6);
    }

    #[test]
    fn test_flush_emits_partial_batch() {
        let mut acc = BatchAccumulator::new(BatchPolicy::new(10, 300));
        assert!(acc.push(record(0)).is_none());

        let batch = acc.flush().expect("partial batch must be emitted");
        assert_eq!(batch.len(), 1);
        assert!(acc.flush().is_none());
    }

    #[test]
    fn test_flush_on_empty_buffer_is_none() {
        let mut acc = BatchAccumulator::new(BatchPolicy::new(10, 300));
        assert!(acc.flush().is_none());
    }

    #[test]
    fn test_twenty_three_rows_make_two_batches_and_a_partial() {
        // Thresholds 10, then 20: 23 rows -> batch of 10, then the trailing
        // 13 flushed as a partial.
        let mut acc = BatchAccumulator::new(BatchPolicy::new(10, 300));
        let mut emitted = Vec::new();
        for i in 0..23 {
            if let Some(b) = acc.push(record(i)) {
                emitted.push(b.len());
            }
        }
        if let Some(b) = acc.flush() {
            emitted.push(b.len());
        }
        assert_eq!(emitted, vec![10, 13]);
        assert_eq!(emitted.iter().sum::<usize>(), 23);
    }
}
