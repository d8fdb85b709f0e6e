//! Create group command
//!
//! Command: pure data structure with validation. Handler: standalone async
//! function that talks to the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::features::shared::validation::{validate_name, NameValidationError};
use crate::store::{MemberStore, StoreError};

/// Command to create a new group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroupCommand {
    /// Display name of the group (must be unique)
    pub name: String,

    /// Per-column default values inherited by imported rows with empty
    /// cells
    #[serde(default)]
    pub default_fields: HashMap<String, String>,
}

/// Response from creating a group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroupResponse {
    pub id: Uuid,
    pub name: String,
    pub default_fields: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
}

/// Errors that can occur when creating a group
#[derive(Debug, thiserror::Error)]
pub enum CreateGroupError {
    #[error("Name validation failed: {0}")]
    NameValidation(#[from] NameValidationError),

    #[error("Group with name '{0}' already exists")]
    DuplicateName(String),

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl CreateGroupCommand {
    pub fn validate(&self) -> Result<(), CreateGroupError> {
        validate_name(&self.name, 256)?;
        Ok(())
    }
}

#[tracing::instrument(skip(store, command), fields(name = %command.name))]
pub async fn handle(
    store: Arc<dyn MemberStore>,
    command: CreateGroupCommand,
) -> Result<CreateGroupResponse, CreateGroupError> {
    command.validate()?;

    let group = store
        .create_group(&command.name, &command.default_fields)
        .await
        .map_err(|e| match e {
            StoreError::Duplicate(_) => CreateGroupError::DuplicateName(command.name.clone()),
            other => CreateGroupError::Store(other),
        })?;

    tracing::info!(group_id = %group.id, "Group created");

    Ok(CreateGroupResponse {
        id: group.id,
        name: group.name,
        default_fields: group.default_fields,
        created_at: group.created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryMemberStore;

    fn command(name: &str) -> CreateGroupCommand {
        CreateGroupCommand {
            name: name.to_string(),
            default_fields: HashMap::new(),
        }
    }

    #[test]
    fn test_validation_empty_name() {
        assert!(matches!(
            command("").validate(),
            Err(CreateGroupError::NameValidation(_))
        ));
    }

    #[tokio::test]
    async fn test_create_group() {
        let store: Arc<dyn MemberStore> = Arc::new(MemoryMemberStore::new());
        let response = handle(store.clone(), command("Newsletter")).await.unwrap();
        assert_eq!(response.name, "Newsletter");
        assert!(store.find_group(response.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let store: Arc<dyn MemberStore> = Arc::new(MemoryMemberStore::new());
        handle(store.clone(), command("Newsletter")).await.unwrap();

        let err = handle(store, command("Newsletter")).await.unwrap_err();
        assert!(matches!(err, CreateGroupError::DuplicateName(_)));
    }
}
