//! Import pipeline orchestrator
//!
//! Drives one import run end to end:
//!
//! 1. Open the row source and capture the header columns
//! 2. For each row: wait on the flow gate, validate, run the duplicate
//!    pre-check, and buffer into the accumulator
//! 3. Dispatch full batches as independent tasks, throttled by the
//!    concurrency governor
//! 4. At end of stream, flush the trailing partial batch, drain every
//!    batch task, finalize the aggregator, and render the report
//!
//! The driving loop is the only producer; batch tasks only touch the
//! aggregator and the governor. Row and batch failures are converted to
//! rejection data at their own boundary; only stream-level faults (
//! malformed CSV, I/O errors) abort the run, with no report produced.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tokio::io::AsyncRead;
use tokio::task::JoinSet;

use crate::store::{Group, MemberStore, StoreError};

use super::aggregate::ImportAggregator;
use super::batch::{BatchAccumulator, BatchPolicy};
use super::flow::FlowGate;
use super::governor::BatchGovernor;
use super::report::ImportReport;
use super::source::RowSource;
use super::types::{Batch, RejectReason};
use super::validate::validate;
use super::worker::insert_batch;

/// Default first-batch size.
pub const DEFAULT_INITIAL_BATCH_SIZE: usize = 10;

/// Default ceiling for the doubling batch threshold.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 300;

/// Default soft cap on batches in flight.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 6;

/// Tuning knobs for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub initial_batch_size: usize,
    pub max_batch_size: usize,
    pub max_in_flight: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            initial_batch_size: DEFAULT_INITIAL_BATCH_SIZE,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}

/// Fatal pipeline errors. Row- and batch-level failures never surface
/// here; they are recorded as rejections and the run continues.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Malformed input stream: {0}")]
    Stream(#[from] csv_async::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Batch task failed: {0}")]
    BatchTask(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub struct ImportPipeline {
    store: Arc<dyn MemberStore>,
    config: PipelineConfig,
}

impl ImportPipeline {
    pub fn new(store: Arc<dyn MemberStore>, config: PipelineConfig) -> Self {
        Self { store, config }
    }

    /// Run one import against `group`, consuming the input stream.
    #[tracing::instrument(skip(self, input), fields(group_id = %group.id))]
    pub async fn run<R>(&self, group: &Group, input: R) -> Result<ImportReport, ImportError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let started = Instant::now();

        let mut source = RowSource::open(input).await?;
        let columns = source.columns();

        let gate = Arc::new(FlowGate::new());
        let governor = Arc::new(BatchGovernor::new(self.config.max_in_flight, gate.clone()));
        let aggregator = Arc::new(ImportAggregator::new());
        let mut accumulator = BatchAccumulator::new(BatchPolicy::new(
            self.config.initial_batch_size,
            self.config.max_batch_size,
        ));
        let mut tasks: JoinSet<()> = JoinSet::new();
        let mut batches = 0u64;

        loop {
            // Backpressure point: while intake is paused, no further row is
            // pulled from the source.
            gate.wait_until_resumed().await;

            let Some(row) = source.next_row().await? else {
                break;
            };

            let record = match validate(row, group) {
                Ok(record) => record,
                Err(rejection) => {
                    aggregator.row_rejected(rejection);
                    continue;
                },
            };

            // Optimistic dedup pre-check; the store's unique constraint at
            // insert time remains the authoritative second tier.
            match self.store.email_exists(group.id, &record.email).await {
                Ok(true) => {
                    aggregator.row_rejected(record.into_rejection(RejectReason::Duplicate));
                    continue;
                },
                Ok(false) => {},
                Err(error) => {
                    tracing::warn!(
                        email = %record.email,
                        error = %error,
                        "Duplicate pre-check failed, rejecting row"
                    );
                    aggregator
                        .row_rejected(record.into_rejection(RejectReason::PersistenceFailure));
                    continue;
                },
            }

            if let Some(batch) = accumulator.push(record) {
                batches += 1;
                self.dispatch(batch, &mut tasks, &aggregator, &governor);
            }
        }

        // The trailing partial batch is processed like any other.
        if let Some(batch) = accumulator.flush() {
            batches += 1;
            self.dispatch(batch, &mut tasks, &aggregator, &governor);
        }

        while let Some(joined) = tasks.join_next().await {
            joined?;
        }

        let totals = aggregator.finalize()?;
        let total_members = self.store.count_members(group.id).await?;

        tracing::info!(
            rows_seen = totals.rows_seen,
            added = totals.added(),
            rejected = totals.rejected(),
            batches,
            total_members,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Import run finished"
        );

        Ok(ImportReport::new(totals, total_members, columns.to_vec()))
    }

    fn dispatch(
        &self,
        batch: Batch,
        tasks: &mut JoinSet<()>,
        aggregator: &Arc<ImportAggregator>,
        governor: &Arc<BatchGovernor>,
    ) {
        aggregator.batch_admitted(batch.len());
        governor.on_dispatch();

        tracing::debug!(
            batch = batch.number,
            records = batch.len(),
            in_flight = governor.active(),
            "Dispatching batch"
        );

        let store = self.store.clone();
        let aggregator = aggregator.clone();
        let governor = governor.clone();
        tasks.spawn(async move {
            let number = batch.number;
            let inserted = insert_batch(&store, batch, &aggregator).await;
            tracing::debug!(batch = number, inserted, "Batch completed");
            aggregator.batch_completed();
            governor.on_complete();
        });
    }
}
