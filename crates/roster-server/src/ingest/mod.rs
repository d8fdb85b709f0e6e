//! Streaming member import pipeline
//!
//! Turns an unbounded CSV row stream into bounded, concurrently processed
//! insert batches while applying backpressure to the source:
//!
//! 1. Row source: lazy CSV row stream with a pause/resume flow gate
//! 2. Validation: pure per-row checks plus group-default normalization
//! 3. Dedup gate: optimistic per-record existence check against the store
//! 4. Batch accumulation: adaptive doubling thresholds (10 up to 300)
//! 5. Concurrency governor: soft cap on batches in flight, pausing intake
//! 6. Insert worker: unordered bulk insert with two-tier failure isolation
//! 7. Aggregation and report: exact counts and an append-only rejection
//!    list rendered as a two-part CSV report
//!
//! Row and batch failures degrade to report rows; only input-stream faults
//! abort a run.

pub mod aggregate;
pub mod batch;
pub mod flow;
pub mod governor;
pub mod pipeline;
pub mod report;
pub mod source;
pub mod types;
pub mod validate;
pub mod worker;

pub use pipeline::{ImportError, ImportPipeline, PipelineConfig};
pub use report::ImportReport;
pub use types::{RejectReason, RejectionRecord};
