//! In-memory implementation of [`MemberStore`]
//!
//! Mirrors the Postgres semantics (case-insensitive per-group uniqueness,
//! unordered bulk insert with per-record outcomes) without a database, so
//! pipeline and feature tests run against the same contract the server
//! runs against in production.
//!
//! Failure injection: `fail_next_batches` makes the next N `bulk_insert`
//! calls fail wholesale, and `fail_email` marks individual records to be
//! rejected at insert time. Both exist to exercise the pipeline's failure
//! isolation tiers.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use uuid::Uuid;

use super::{Group, InsertOutcome, Member, MemberStore, NewMember, StoreError};

#[derive(Default)]
struct Inner {
    groups: HashMap<Uuid, Group>,
    members: Vec<Member>,
    /// (group_id, lowercased email) pairs already persisted.
    emails: HashSet<(Uuid, String)>,
    /// Remaining bulk_insert calls that fail wholesale.
    fail_batches: usize,
    /// Lowercased emails whose whole batch fails at insert time.
    fail_batch_emails: HashSet<String>,
    /// Lowercased emails rejected per-record at insert time.
    fail_emails: HashSet<String>,
}

#[derive(Default)]
pub struct MemoryMemberStore {
    inner: Mutex<Inner>,
}

impl MemoryMemberStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a group and return it.
    pub fn add_group(&self, name: &str, default_fields: HashMap<String, String>) -> Group {
        let now = Utc::now();
        let group = Group {
            id: Uuid::new_v4(),
            name: name.to_string(),
            default_fields,
            created_at: now,
            updated_at: now,
        };
        self.lock().groups.insert(group.id, group.clone());
        group
    }

    /// Make the next `n` calls to `bulk_insert` fail wholesale.
    pub fn fail_next_batches(&self, n: usize) {
        self.lock().fail_batches = n;
    }

    /// Fail any `bulk_insert` call wholesale if its batch contains this
    /// email. Deterministic regardless of batch completion order.
    pub fn fail_batch_containing(&self, email: &str) {
        self.lock().fail_batch_emails.insert(email.to_lowercase());
    }

    /// Reject this email with a per-record failure at insert time.
    pub fn fail_email(&self, email: &str) {
        self.lock().fail_emails.insert(email.to_lowercase());
    }

    pub fn member_count(&self, group_id: Uuid) -> usize {
        self.lock()
            .members
            .iter()
            .filter(|m| m.group_id == group_id)
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl MemberStore for MemoryMemberStore {
    async fn find_group(&self, id: Uuid) -> Result<Option<Group>, StoreError> {
        Ok(self.lock().groups.get(&id).cloned())
    }

    async fn create_group(
        &self,
        name: &str,
        default_fields: &HashMap<String, String>,
    ) -> Result<Group, StoreError> {
        let mut inner = self.lock();
        if inner.groups.values().any(|g| g.name == name) {
            return Err(StoreError::Duplicate(format!("Group '{}'", name)));
        }
        let now = Utc::now();
        let group = Group {
            id: Uuid::new_v4(),
            name: name.to_string(),
            default_fields: default_fields.clone(),
            created_at: now,
            updated_at: now,
        };
        inner.groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn email_exists(&self, group_id: Uuid, email: &str) -> Result<bool, StoreError> {
        Ok(self
            .lock()
            .emails
            .contains(&(group_id, email.to_lowercase())))
    }

    async fn bulk_insert(&self, members: Vec<NewMember>) -> Result<Vec<InsertOutcome>, StoreError> {
        let mut inner = self.lock();

        if inner.fail_batches > 0 {
            inner.fail_batches -= 1;
            return Err(StoreError::Unavailable("injected batch failure".to_string()));
        }

        if members
            .iter()
            .any(|m| inner.fail_batch_emails.contains(&m.email.to_lowercase()))
        {
            return Err(StoreError::Unavailable(
                "injected batch failure (poisoned email)".to_string(),
            ));
        }

        let mut outcomes = Vec::with_capacity(members.len());
        for member in members {
            let key = (member.group_id, member.email.to_lowercase());

            if inner.fail_emails.contains(&key.1) {
                outcomes.push(InsertOutcome::Failed("injected record failure".to_string()));
                continue;
            }

            if inner.emails.contains(&key) {
                outcomes.push(InsertOutcome::Duplicate);
                continue;
            }

            inner.emails.insert(key);
            inner.members.push(Member {
                id: Uuid::new_v4(),
                group_id: member.group_id,
                email: member.email,
                name: member.name,
                subscribed: member.subscribed,
                fields: member.fields,
                created_at: Utc::now(),
            });
            outcomes.push(InsertOutcome::Inserted);
        }

        Ok(outcomes)
    }

    async fn count_members(&self, group_id: Uuid) -> Result<u64, StoreError> {
        Ok(self.member_count(group_id) as u64)
    }

    async fn list_members(
        &self,
        group_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Member>, u64), StoreError> {
        let inner = self.lock();
        let all: Vec<&Member> = inner
            .members
            .iter()
            .filter(|m| m.group_id == group_id)
            .collect();
        let total = all.len() as u64;
        let page = all
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_member(group_id: Uuid, email: &str) -> NewMember {
        NewMember {
            group_id,
            email: email.to_string(),
            name: "Test".to_string(),
            subscribed: true,
            fields: serde_json::json!({}),
        }
    }

    #[tokio::test]
    async fn test_bulk_insert_outcomes() {
        let store = MemoryMemberStore::new();
        let group = store.add_group("list", HashMap::new());

        let outcomes = store
            .bulk_insert(vec![
                new_member(group.id, "a@example.com"),
                new_member(group.id, "A@example.com"),
                new_member(group.id, "b@example.com"),
            ])
            .await
            .unwrap();

        assert_eq!(
            outcomes,
            vec![
                InsertOutcome::Inserted,
                InsertOutcome::Duplicate,
                InsertOutcome::Inserted,
            ]
        );
        assert_eq!(store.member_count(group.id), 2);
    }

    #[tokio::test]
    async fn test_email_exists_is_case_insensitive() {
        let store = MemoryMemberStore::new();
        let group = store.add_group("list", HashMap::new());
        store
            .bulk_insert(vec![new_member(group.id, "User@Example.com")])
            .await
            .unwrap();

        assert!(store.email_exists(group.id, "user@example.com").await.unwrap());
        assert!(!store.email_exists(group.id, "other@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_injected_batch_failure() {
        let store = MemoryMemberStore::new();
        let group = store.add_group("list", HashMap::new());
        store.fail_next_batches(1);

        let err = store
            .bulk_insert(vec![new_member(group.id, "a@example.com")])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));

        // The next call succeeds again.
        let outcomes = store
            .bulk_insert(vec![new_member(group.id, "a@example.com")])
            .await
            .unwrap();
        assert_eq!(outcomes, vec![InsertOutcome::Inserted]);
    }

    #[tokio::test]
    async fn test_duplicate_group_name() {
        let store = MemoryMemberStore::new();
        store.add_group("list", HashMap::new());
        let err = store.create_group("list", &HashMap::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }
}
