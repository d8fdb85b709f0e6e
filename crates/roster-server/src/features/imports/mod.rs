//! Member import feature: the streaming CSV ingestion endpoint

pub mod commands;
pub mod routes;

pub use routes::imports_routes;
