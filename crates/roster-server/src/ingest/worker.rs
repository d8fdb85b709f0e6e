//! Batch insert worker with two-tier failure isolation
//!
//! Persists one batch through [`MemberStore::bulk_insert`] and converts
//! every failure into data instead of letting it propagate:
//!
//! - *Per-record* store rejection: the record becomes a rejection
//!   (`duplicate` for a uniqueness loss, `persistence-failure` otherwise);
//!   its siblings are unaffected. This tier is the authoritative duplicate
//!   check covering the race left open by the optimistic pre-check.
//! - *Whole-batch* failure: every record in the batch becomes a
//!   `persistence-failure` rejection and the run continues with the next
//!   batch. A batch failure is never fatal to the run.

use std::sync::Arc;

use serde_json::Value;

use crate::store::{InsertOutcome, MemberStore, NewMember};

use super::aggregate::ImportAggregator;
use super::types::{Batch, NormalizedRecord, RejectReason};

fn to_new_member(record: &NormalizedRecord) -> NewMember {
    let fields = Value::Object(
        record
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    );

    NewMember {
        group_id: record.group_id,
        email: record.email.clone(),
        name: record.name.clone(),
        subscribed: record.subscribed,
        fields,
    }
}

/// Persist one batch, recording rejections into the aggregator. Returns
/// the number of records actually inserted.
pub async fn insert_batch(
    store: &Arc<dyn MemberStore>,
    batch: Batch,
    aggregator: &Arc<ImportAggregator>,
) -> usize {
    let batch_number = batch.number;
    let batch_size = batch.len();
    let members: Vec<NewMember> = batch.records.iter().map(to_new_member).collect();

    match store.bulk_insert(members).await {
        Ok(outcomes) => {
            let mut inserted = 0;
            for (record, outcome) in batch.records.into_iter().zip(outcomes) {
                match outcome {
                    InsertOutcome::Inserted => inserted += 1,
                    InsertOutcome::Duplicate => {
                        aggregator.push_rejection(record.into_rejection(RejectReason::Duplicate));
                    },
                    InsertOutcome::Failed(message) => {
                        tracing::warn!(
                            batch = batch_number,
                            email = %record.email,
                            error = %message,
                            "Record rejected by store"
                        );
                        aggregator
                            .push_rejection(record.into_rejection(RejectReason::PersistenceFailure));
                    },
                }
            }
            inserted
        },
        Err(error) => {
            // Whole-batch failure: degrade every record to a row error.
            tracing::warn!(
                batch = batch_number,
                records = batch_size,
                error = %error,
                "Batch insert failed, rejecting all records in batch"
            );
            for record in batch.records {
                aggregator.push_rejection(record.into_rejection(RejectReason::PersistenceFailure));
            }
            0
        },
    }
}
