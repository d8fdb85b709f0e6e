//! Persistence layer for groups and members
//!
//! The import pipeline and the API features talk to storage through the
//! [`MemberStore`] trait. The server wires in the PostgreSQL implementation
//! ([`postgres::PgMemberStore`]); tests use the in-memory implementation
//! ([`memory::MemoryMemberStore`]) with identical semantics.
//!
//! The contract that matters to the pipeline: member emails are unique per
//! group (case-insensitive), and [`MemberStore::bulk_insert`] is unordered:
//! one record's constraint violation never blocks its siblings. A `Duplicate`
//! outcome from the store is the authoritative duplicate check backing the
//! optimistic [`MemberStore::email_exists`] pre-check.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryMemberStore;
pub use postgres::PgMemberStore;

/// A subscriber group: the collection members are imported into.
///
/// `default_fields` supplies per-column fallback values inherited by
/// imported rows with empty cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub default_fields: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A stored member row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub group_id: Uuid,
    pub email: String,
    pub name: String,
    pub subscribed: bool,
    /// All imported columns for this member, keyed by column name.
    pub fields: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// A candidate member handed to [`MemberStore::bulk_insert`].
#[derive(Debug, Clone)]
pub struct NewMember {
    pub group_id: Uuid,
    pub email: String,
    pub name: String,
    pub subscribed: bool,
    pub fields: serde_json::Value,
}

/// Per-record result of a bulk insert, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Record was persisted.
    Inserted,
    /// Record lost to the unique (group, email) constraint.
    Duplicate,
    /// Record was rejected by the store for some other reason.
    Failed(String),
}

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0} already exists")]
    Duplicate(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Storage interface consumed by the import pipeline and the API features.
///
/// `bulk_insert` returns one [`InsertOutcome`] per input record; an `Err`
/// return means the whole batch failed (e.g. the store was unreachable) and
/// nothing in it can be assumed persisted.
#[async_trait]
pub trait MemberStore: Send + Sync {
    async fn find_group(&self, id: Uuid) -> Result<Option<Group>, StoreError>;

    async fn create_group(
        &self,
        name: &str,
        default_fields: &HashMap<String, String>,
    ) -> Result<Group, StoreError>;

    /// Optimistic duplicate pre-check: does a member with this email already
    /// exist in the group? Case-insensitive.
    async fn email_exists(&self, group_id: Uuid, email: &str) -> Result<bool, StoreError>;

    /// Unordered bulk insert with per-record outcomes in input order.
    async fn bulk_insert(&self, members: Vec<NewMember>) -> Result<Vec<InsertOutcome>, StoreError>;

    /// Authoritative member count for a group.
    async fn count_members(&self, group_id: Uuid) -> Result<u64, StoreError>;

    /// Page of members plus the total count for the group.
    async fn list_members(
        &self,
        group_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Member>, u64), StoreError>;
}
