//! Member API routes
//!
//! - `GET /api/v1/groups/:group_id/members` - List members with pagination

use crate::api::response::{ApiResponse, ErrorResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use crate::features::FeatureState;

use super::queries::{ListMembersError, ListMembersQuery};

/// Creates the members router, nested under a group path
pub fn members_routes() -> Router<FeatureState> {
    Router::new().route("/", get(list_members))
}

/// List members of a group
///
/// # Response
///
/// - `200 OK` - Page of members with pagination metadata
/// - `400 Bad Request` - Invalid pagination parameters
/// - `404 Not Found` - Group not found
#[tracing::instrument(skip(state, query))]
async fn list_members(
    State(state): State<FeatureState>,
    Path(group_id): Path<Uuid>,
    Query(query): Query<ListMembersQuery>,
) -> Result<Response, ListMembersError> {
    let response = super::queries::list::handle(state.store, group_id, query).await?;

    let meta = json!({ "pagination": response.pagination });

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success_with_meta(response.items, meta)),
    )
        .into_response())
}

impl IntoResponse for ListMembersError {
    fn into_response(self) -> Response {
        match self {
            ListMembersError::InvalidPagination(_) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            ListMembersError::GroupNotFound(_) => {
                let error = ErrorResponse::new("NOT_FOUND", self.to_string());
                (StatusCode::NOT_FOUND, Json(error)).into_response()
            },
            ListMembersError::Store(_) => {
                tracing::error!("Store error during member listing: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A storage error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}
