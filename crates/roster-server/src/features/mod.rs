//! Feature modules implementing the roster API
//!
//! Each feature is a vertical slice with its own commands, queries, and
//! routes:
//!
//! - **groups**: group management (pass-through to the store)
//! - **members**: member listing (pass-through to the store)
//! - **imports**: the streaming CSV member import endpoint
//!
//! Commands and queries are plain data structures handled by standalone
//! async functions; routes wire them to Axum handlers.

pub mod groups;
pub mod imports;
pub mod members;
pub mod shared;

use axum::Router;
use std::sync::Arc;

use crate::config::ImportConfig;
use crate::store::MemberStore;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// Persistence layer the features and the import pipeline run against
    pub store: Arc<dyn MemberStore>,
    /// Import pipeline and upload spool configuration
    pub import: ImportConfig,
}

/// Creates the main API router with all feature routes mounted
///
/// - `/groups` - Group management
/// - `/groups/:group_id/members` - Member listing
/// - `/groups/:group_id/members/import` - CSV member import
pub fn router(state: FeatureState) -> Router<()> {
    let group_scoped = members::members_routes().merge(imports::imports_routes());

    Router::new()
        .nest(
            "/groups",
            groups::groups_routes().nest("/:group_id/members", group_scoped),
        )
        .with_state(state)
}
