//! Group management feature

pub mod commands;
pub mod queries;
pub mod routes;

pub use routes::groups_routes;
