//! Group API routes
//!
//! - `POST /api/v1/groups` - Create a new group
//! - `GET /api/v1/groups/:group_id` - Get a single group

use crate::api::response::{ApiResponse, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::features::FeatureState;

use super::{
    commands::{CreateGroupCommand, CreateGroupError},
    queries::{GetGroupError, GetGroupQuery},
};

/// Creates the groups router with all routes configured
pub fn groups_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", post(create_group))
        .route("/:group_id", get(get_group))
}

/// Create a new group
///
/// # Response
///
/// - `201 Created` - Group created successfully
/// - `400 Bad Request` - Validation error
/// - `409 Conflict` - Group with name already exists
#[tracing::instrument(skip(state, command), fields(name = %command.name))]
async fn create_group(
    State(state): State<FeatureState>,
    Json(command): Json<CreateGroupCommand>,
) -> Result<Response, GroupApiError> {
    let response = super::commands::create::handle(state.store, command).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))).into_response())
}

/// Get a single group by id
///
/// # Response
///
/// - `200 OK` - Group found
/// - `404 Not Found` - Group not found
#[tracing::instrument(skip(state))]
async fn get_group(
    State(state): State<FeatureState>,
    Path(group_id): Path<Uuid>,
) -> Result<Response, GroupApiError> {
    let response = super::queries::get::handle(state.store, GetGroupQuery { id: group_id }).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

/// Unified error type for group API endpoints
#[derive(Debug)]
enum GroupApiError {
    Create(CreateGroupError),
    Get(GetGroupError),
}

impl From<CreateGroupError> for GroupApiError {
    fn from(err: CreateGroupError) -> Self {
        Self::Create(err)
    }
}

impl From<GetGroupError> for GroupApiError {
    fn from(err: GetGroupError) -> Self {
        Self::Get(err)
    }
}

impl IntoResponse for GroupApiError {
    fn into_response(self) -> Response {
        match self {
            GroupApiError::Create(CreateGroupError::NameValidation(_)) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            GroupApiError::Create(CreateGroupError::DuplicateName(ref name)) => {
                let error = ErrorResponse::new(
                    "CONFLICT",
                    format!("Group with name '{}' already exists", name),
                );
                (StatusCode::CONFLICT, Json(error)).into_response()
            },
            GroupApiError::Create(CreateGroupError::Store(_)) => {
                tracing::error!("Store error during group creation: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A storage error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
            GroupApiError::Get(GetGroupError::NotFound(id)) => {
                let error =
                    ErrorResponse::new("NOT_FOUND", format!("Group '{}' not found", id));
                (StatusCode::NOT_FOUND, Json(error)).into_response()
            },
            GroupApiError::Get(GetGroupError::Store(_)) => {
                tracing::error!("Store error during group retrieval: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A storage error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}

impl std::fmt::Display for GroupApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create(e) => write!(f, "{}", e),
            Self::Get(e) => write!(f, "{}", e),
        }
    }
}
