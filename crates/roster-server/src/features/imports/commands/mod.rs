//! Write operations for imports

pub mod import;

pub use import::{ImportMembersCommand, ImportMembersError, ImportMembersResponse};
