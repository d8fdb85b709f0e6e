//! Read operations for members

pub mod list;

pub use list::{ListMembersError, ListMembersQuery, ListMembersResponse};
