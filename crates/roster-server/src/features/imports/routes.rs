//! Import API routes
//!
//! - `POST /api/v1/groups/:group_id/members/import` - Upload a CSV of
//!   candidate members (multipart, field `file`) and receive the outcome
//!   report as `text/csv`
//!
//! The caller sees either the full two-part report (200) or a single
//! error response (400 for input errors, 500 for stream faults), never a
//! half-written report.

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use std::path::{Path as FsPath, PathBuf};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::api::response::ErrorResponse;
use crate::features::FeatureState;
use crate::ingest::ImportError;

use super::commands::{ImportMembersCommand, ImportMembersError};

/// Multipart field name carrying the CSV upload.
const FILE_FIELD: &str = "file";

/// Creates the imports router, merged into the group-scoped members router
pub fn imports_routes() -> Router<FeatureState> {
    Router::new()
        .route("/import", post(import_members))
        // Uploaded rosters can exceed the default body limit; memory stays
        // bounded because the body is streamed straight to the spool file.
        .layer(DefaultBodyLimit::disable())
}

/// Import a CSV of candidate members into a group
///
/// # Response
///
/// - `200 OK` - Full report as `text/csv`
/// - `400 Bad Request` - Unknown group or no file supplied
/// - `500 Internal Server Error` - Malformed CSV or I/O fault mid-stream
#[tracing::instrument(skip(state, multipart))]
async fn import_members(
    State(state): State<FeatureState>,
    Path(group_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Response, ImportApiError> {
    let upload = spool_upload(&state.import.upload_dir, group_id, multipart).await?;
    let (filename, spool_path) = upload.ok_or(ImportApiError::FileRequired)?;

    let command = ImportMembersCommand {
        group_id,
        filename,
        spool_path,
    };

    let response =
        super::commands::import::handle(state.store, state.import.pipeline_config(), command)
            .await?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/csv")],
        response.report_csv,
    )
        .into_response())
}

/// Stream the `file` multipart field to a spool file under `upload_dir`.
/// Returns `None` when the request carries no file field.
async fn spool_upload(
    upload_dir: &FsPath,
    group_id: Uuid,
    mut multipart: Multipart,
) -> Result<Option<(String, PathBuf)>, ImportApiError> {
    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .unwrap_or("upload.csv")
            .to_string();

        tokio::fs::create_dir_all(upload_dir)
            .await
            .map_err(ImportApiError::Spool)?;

        let spool_path = upload_dir.join(format!("{}-{}.csv", group_id, Uuid::new_v4()));
        let mut file = tokio::fs::File::create(&spool_path)
            .await
            .map_err(ImportApiError::Spool)?;

        while let Some(chunk) = field.chunk().await? {
            file.write_all(&chunk).await.map_err(ImportApiError::Spool)?;
        }
        file.flush().await.map_err(ImportApiError::Spool)?;

        return Ok(Some((filename, spool_path)));
    }

    Ok(None)
}

/// Unified error type for the import endpoint
#[derive(Debug)]
enum ImportApiError {
    FileRequired,
    Multipart(MultipartError),
    Spool(std::io::Error),
    Command(ImportMembersError),
}

impl From<MultipartError> for ImportApiError {
    fn from(err: MultipartError) -> Self {
        Self::Multipart(err)
    }
}

impl From<ImportMembersError> for ImportApiError {
    fn from(err: ImportMembersError) -> Self {
        Self::Command(err)
    }
}

impl IntoResponse for ImportApiError {
    fn into_response(self) -> Response {
        match self {
            ImportApiError::FileRequired
            | ImportApiError::Command(ImportMembersError::FileRequired) => {
                let error = ErrorResponse::new(
                    "VALIDATION_ERROR",
                    "A CSV file is required and was not supplied",
                );
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            ImportApiError::Multipart(ref e) => {
                let error =
                    ErrorResponse::new("VALIDATION_ERROR", format!("Invalid upload: {}", e));
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            ImportApiError::Command(ImportMembersError::GroupNotFound(id)) => {
                let error = ErrorResponse::new("NOT_FOUND", format!("Group '{}' not found", id));
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            ImportApiError::Command(ImportMembersError::Pipeline(ImportError::Stream(ref e))) => {
                tracing::error!("Import aborted on malformed input stream: {}", e);
                let error = ErrorResponse::new(
                    "STREAM_ERROR",
                    format!("Import aborted, no report produced: {}", e),
                );
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
            ImportApiError::Spool(ref e) => {
                tracing::error!("Failed to spool uploaded file: {}", e);
                let error =
                    ErrorResponse::new("INTERNAL_ERROR", "Failed to store uploaded file");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
            ImportApiError::Command(ref e) => {
                tracing::error!("Import failed: {}", e);
                let error = ErrorResponse::new("INTERNAL_ERROR", "Import failed");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}
