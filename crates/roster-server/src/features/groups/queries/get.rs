//! Get group query

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::store::{MemberStore, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetGroupQuery {
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetGroupResponse {
    pub id: Uuid,
    pub name: String,
    pub default_fields: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum GetGroupError {
    #[error("Group '{0}' not found")]
    NotFound(Uuid),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

#[tracing::instrument(skip(store))]
pub async fn handle(
    store: Arc<dyn MemberStore>,
    query: GetGroupQuery,
) -> Result<GetGroupResponse, GetGroupError> {
    let group = store
        .find_group(query.id)
        .await?
        .ok_or(GetGroupError::NotFound(query.id))?;

    Ok(GetGroupResponse {
        id: group.id,
        name: group.name,
        default_fields: group.default_fields,
        created_at: group.created_at,
        updated_at: group.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryMemberStore;

    #[tokio::test]
    async fn test_get_existing_group() {
        let store = Arc::new(MemoryMemberStore::new());
        let group = store.add_group("Newsletter", HashMap::new());
        let store: Arc<dyn MemberStore> = store;

        let response = handle(store, GetGroupQuery { id: group.id }).await.unwrap();
        assert_eq!(response.id, group.id);
        assert_eq!(response.name, "Newsletter");
    }

    #[tokio::test]
    async fn test_unknown_group_is_not_found() {
        let store: Arc<dyn MemberStore> = Arc::new(MemoryMemberStore::new());
        let err = handle(store, GetGroupQuery { id: Uuid::new_v4() })
            .await
            .unwrap_err();
        assert!(matches!(err, GetGroupError::NotFound(_)));
    }
}
