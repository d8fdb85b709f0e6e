//! List members query

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::features::shared::pagination::{PaginationMetadata, PaginationParams};
use crate::store::{MemberStore, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ListMembersQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
}

impl ListMembersQuery {
    fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberItem {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub subscribed: bool,
    pub fields: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListMembersResponse {
    pub items: Vec<MemberItem>,
    pub pagination: PaginationMetadata,
}

#[derive(Debug, thiserror::Error)]
pub enum ListMembersError {
    #[error("Group '{0}' not found")]
    GroupNotFound(Uuid),

    #[error("Invalid pagination: {0}")]
    InvalidPagination(&'static str),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

#[tracing::instrument(skip(store, query), fields(group_id = %group_id))]
pub async fn handle(
    store: Arc<dyn MemberStore>,
    group_id: Uuid,
    query: ListMembersQuery,
) -> Result<ListMembersResponse, ListMembersError> {
    let pagination = query.pagination();
    pagination
        .validate()
        .map_err(ListMembersError::InvalidPagination)?;

    store
        .find_group(group_id)
        .await?
        .ok_or(ListMembersError::GroupNotFound(group_id))?;

    let (members, total) = store
        .list_members(group_id, pagination.per_page(), pagination.offset())
        .await?;

    let items = members
        .into_iter()
        .map(|m| MemberItem {
            id: m.id,
            email: m.email,
            name: m.name,
            subscribed: m.subscribed,
            fields: m.fields,
            created_at: m.created_at,
        })
        .collect();

    Ok(ListMembersResponse {
        items,
        pagination: PaginationMetadata::new(
            pagination.page(),
            pagination.per_page(),
            total as i64,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryMemberStore, NewMember};
    use std::collections::HashMap;

    async fn seeded_store(members: usize) -> (Arc<MemoryMemberStore>, Uuid) {
        let store = Arc::new(MemoryMemberStore::new());
        let group = store.add_group("list", HashMap::new());
        let batch = (0..members)
            .map(|i| NewMember {
                group_id: group.id,
                email: format!("user{}@example.com", i),
                name: format!("User {}", i),
                subscribed: true,
                fields: serde_json::json!({}),
            })
            .collect();
        store.bulk_insert(batch).await.unwrap();
        (store, group.id)
    }

    #[tokio::test]
    async fn test_lists_page_with_metadata() {
        let (store, group_id) = seeded_store(45).await;

        let query = ListMembersQuery {
            page: Some(2),
            per_page: Some(20),
        };
        let response = handle(store, group_id, query).await.unwrap();

        assert_eq!(response.items.len(), 20);
        assert_eq!(response.pagination.total, 45);
        assert_eq!(response.pagination.pages, 3);
    }

    #[tokio::test]
    async fn test_unknown_group_is_not_found() {
        let store: Arc<dyn MemberStore> = Arc::new(MemoryMemberStore::new());
        let err = handle(store, Uuid::new_v4(), ListMembersQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ListMembersError::GroupNotFound(_)));
    }

    #[tokio::test]
    async fn test_invalid_pagination_rejected() {
        let (store, group_id) = seeded_store(1).await;
        let query = ListMembersQuery {
            page: Some(0),
            per_page: None,
        };
        let err = handle(store, group_id, query).await.unwrap_err();
        assert!(matches!(err, ListMembersError::InvalidPagination(_)));
    }
}
