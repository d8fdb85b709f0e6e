//! Member listing feature

pub mod queries;
pub mod routes;

pub use routes::members_routes;
