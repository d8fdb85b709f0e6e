//! Write operations for groups

pub mod create;

pub use create::{CreateGroupCommand, CreateGroupError, CreateGroupResponse};
