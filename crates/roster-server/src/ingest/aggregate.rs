//! Run-wide error and stats aggregation
//!
//! [`ImportAggregator`] is the only mutable state shared across
//! concurrently dispatched batch tasks: a monotonic rows-seen counter, an
//! append-only rejection list, and the outstanding-batch count that gates
//! finalization. Counters are atomics and the list sits behind a mutex, so
//! the aggregator stays correct on a multi-threaded runtime.
//!
//! Counting discipline: rows rejected by validation or the dedup gate are
//! counted by the driving task at the moment of rejection; admitted rows
//! are counted once per batch at dispatch. Either way a row is counted
//! exactly once, which is what makes `rows_seen == persisted + rejected`
//! hold at the end of every run.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{bail, Result};

use super::types::RejectionRecord;

/// Final totals handed to the report generator.
#[derive(Debug)]
pub struct RunTotals {
    pub rows_seen: u64,
    pub rejections: Vec<RejectionRecord>,
}

impl RunTotals {
    pub fn rejected(&self) -> u64 {
        self.rejections.len() as u64
    }

    pub fn added(&self) -> u64 {
        self.rows_seen - self.rejected()
    }
}

#[derive(Debug, Default)]
pub struct ImportAggregator {
    rows_seen: AtomicU64,
    outstanding: AtomicUsize,
    rejections: Mutex<Vec<RejectionRecord>>,
}

impl ImportAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a row rejected before batch admission (validation or dedup).
    /// Counts the row and appends the rejection in one step.
    pub fn row_rejected(&self, rejection: RejectionRecord) {
        self.rows_seen.fetch_add(1, Ordering::SeqCst);
        self.push_rejection(rejection);
    }

    /// Record a dispatched batch: its rows are counted here, once, and the
    /// outstanding count rises until the batch task reports completion.
    pub fn batch_admitted(&self, rows: usize) {
        self.rows_seen.fetch_add(rows as u64, Ordering::SeqCst);
        self.outstanding.fetch_add(1, Ordering::SeqCst);
    }

    /// Append a rejection produced inside a batch task (insert-time
    /// duplicate or persistence failure).
    pub fn push_rejection(&self, rejection: RejectionRecord) {
        self.lock().push(rejection);
    }

    pub fn batch_completed(&self) {
        self.outstanding.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    pub fn rows_seen(&self) -> u64 {
        self.rows_seen.load(Ordering::SeqCst)
    }

    /// Take the final totals. Fails if any dispatched batch has not
    /// completed; callers must drain their batch tasks first.
    pub fn finalize(&self) -> Result<RunTotals> {
        let outstanding = self.outstanding();
        if outstanding != 0 {
            bail!("cannot finalize with {} batches outstanding", outstanding);
        }

        Ok(RunTotals {
            rows_seen: self.rows_seen(),
            rejections: std::mem::take(&mut *self.lock()),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<RejectionRecord>> {
        match self.rejections.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::RejectReason;

    fn rejection(reason: RejectReason) -> RejectionRecord {
        RejectionRecord {
            fields: vec![("email".to_string(), "x@example.com".to_string())],
            reason,
        }
    }

    #[test]
    fn test_row_rejected_counts_once() {
        let agg = ImportAggregator::new();
        agg.row_rejected(rejection(RejectReason::MissingName));
        agg.row_rejected(rejection(RejectReason::InvalidEmail));

        let totals = agg.finalize().unwrap();
        assert_eq!(totals.rows_seen, 2);
        assert_eq!(totals.rejected(), 2);
        assert_eq!(totals.added(), 0);
    }

    #[test]
    fn test_batch_admission_counts_rows_per_batch() {
        let agg = ImportAggregator::new();
        agg.batch_admitted(10);
        agg.batch_admitted(3);
        assert_eq!(agg.rows_seen(), 13);
        assert_eq!(agg.outstanding(), 2);
    }

    #[test]
    fn test_finalize_refused_while_batches_outstanding() {
        let agg = ImportAggregator::new();
        agg.batch_admitted(5);
        assert!(agg.finalize().is_err());

        agg.batch_completed();
        let totals = agg.finalize().unwrap();
        assert_eq!(totals.rows_seen, 5);
        assert_eq!(totals.added(), 5);
    }

    #[test]
    fn test_invariant_rows_seen_equals_added_plus_rejected() {
        let agg = ImportAggregator::new();
        // 2 rejected at validation, a batch of 4 with 1 insert-time duplicate.
        agg.row_rejected(rejection(RejectReason::MissingName));
        agg.row_rejected(rejection(RejectReason::InvalidEmail));
        agg.batch_admitted(4);
        agg.push_rejection(rejection(RejectReason::Duplicate));
        agg.batch_completed();

        let totals = agg.finalize().unwrap();
        assert_eq!(totals.rows_seen, 6);
        assert_eq!(totals.rejected(), 3);
        assert_eq!(totals.added(), 3);
        assert_eq!(totals.rows_seen, totals.added() + totals.rejected());
    }
}
