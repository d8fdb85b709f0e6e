//! Import members command
//!
//! Runs the streaming import pipeline against a spooled upload file and
//! renders the outcome report. The spooled file is deleted after
//! processing regardless of success or failure; a failed deletion is
//! logged, never reported to the caller.

use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use crate::ingest::{ImportError, ImportPipeline, PipelineConfig};
use crate::store::{MemberStore, StoreError};

/// Command to import a CSV of candidate members into a group
#[derive(Debug, Clone)]
pub struct ImportMembersCommand {
    pub group_id: Uuid,
    /// Original filename as uploaded, for logging only.
    pub filename: String,
    /// Path the upload was spooled to.
    pub spool_path: PathBuf,
}

/// Response from an import run
#[derive(Debug, Clone)]
pub struct ImportMembersResponse {
    pub added: u64,
    pub not_added: u64,
    pub total_members: u64,
    /// The rendered two-part CSV report returned to the caller.
    pub report_csv: String,
}

/// Errors that can occur when importing members
#[derive(Debug, thiserror::Error)]
pub enum ImportMembersError {
    #[error("Group '{0}' not found")]
    GroupNotFound(Uuid),

    #[error("A CSV file is required and was not supplied")]
    FileRequired,

    #[error("Failed to read uploaded file: {0}")]
    Spool(#[from] std::io::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Pipeline(#[from] ImportError),

    #[error("Failed to render report: {0}")]
    Report(#[from] csv::Error),
}

#[tracing::instrument(
    skip(store, config, command),
    fields(group_id = %command.group_id, filename = %command.filename)
)]
pub async fn handle(
    store: Arc<dyn MemberStore>,
    config: PipelineConfig,
    command: ImportMembersCommand,
) -> Result<ImportMembersResponse, ImportMembersError> {
    let result = run(store, config, &command).await;

    // Best-effort cleanup of the spooled upload, on success and failure
    // alike.
    if let Err(error) = tokio::fs::remove_file(&command.spool_path).await {
        tracing::warn!(
            path = %command.spool_path.display(),
            error = %error,
            "Failed to delete spooled upload file"
        );
    }

    result
}

async fn run(
    store: Arc<dyn MemberStore>,
    config: PipelineConfig,
    command: &ImportMembersCommand,
) -> Result<ImportMembersResponse, ImportMembersError> {
    // Input errors fail here, before any row is read.
    let group = store
        .find_group(command.group_id)
        .await?
        .ok_or(ImportMembersError::GroupNotFound(command.group_id))?;

    let file = tokio::fs::File::open(&command.spool_path).await?;

    let pipeline = ImportPipeline::new(store, config);
    let report = pipeline.run(&group, file).await?;
    let report_csv = report.to_csv()?;

    tracing::info!(
        added = report.added,
        not_added = report.not_added,
        total_members = report.total_members,
        "Import completed"
    );

    Ok(ImportMembersResponse {
        added: report.added,
        not_added: report.not_added,
        total_members: report.total_members,
        report_csv,
    })
}
