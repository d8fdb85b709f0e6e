//! Read operations for groups

pub mod get;

pub use get::{GetGroupError, GetGroupQuery, GetGroupResponse};
