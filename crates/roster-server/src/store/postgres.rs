//! PostgreSQL implementation of [`MemberStore`]
//!
//! Uniqueness is enforced by the `members_group_email_idx` unique index on
//! `(group_id, lower(email))`; `bulk_insert` rides on it with a single
//! `INSERT ... ON CONFLICT DO NOTHING` so one conflicting record never
//! blocks the rest of its batch.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use super::{Group, InsertOutcome, Member, MemberStore, NewMember, StoreError};

/// Postgres error code for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct PgMemberStore {
    pool: PgPool,
}

impl PgMemberStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn group_from_row(row: &sqlx::postgres::PgRow) -> Result<Group, sqlx::Error> {
    let default_fields: serde_json::Value = row.try_get("default_fields")?;
    let default_fields = default_fields
        .as_object()
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default();

    Ok(Group {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        default_fields,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

fn member_from_row(row: &sqlx::postgres::PgRow) -> Result<Member, sqlx::Error> {
    Ok(Member {
        id: row.try_get("id")?,
        group_id: row.try_get("group_id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        subscribed: row.try_get("subscribed")?,
        fields: row.try_get("fields")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

#[async_trait]
impl MemberStore for PgMemberStore {
    async fn find_group(&self, id: Uuid) -> Result<Option<Group>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, default_fields, created_at, updated_at
            FROM groups
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(group_from_row).transpose().map_err(Into::into)
    }

    async fn create_group(
        &self,
        name: &str,
        default_fields: &HashMap<String, String>,
    ) -> Result<Group, StoreError> {
        let defaults = serde_json::Value::Object(
            default_fields
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect(),
        );

        let row = sqlx::query(
            r#"
            INSERT INTO groups (id, name, default_fields)
            VALUES ($1, $2, $3)
            RETURNING id, name, default_fields, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(defaults)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                StoreError::Duplicate(format!("Group '{}'", name))
            },
            _ => StoreError::Database(e),
        })?;

        group_from_row(&row).map_err(Into::into)
    }

    async fn email_exists(&self, group_id: Uuid, email: &str) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM members
                WHERE group_id = $1 AND lower(email) = lower($2)
            )
            "#,
        )
        .bind(group_id)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn bulk_insert(&self, members: Vec<NewMember>) -> Result<Vec<InsertOutcome>, StoreError> {
        if members.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = members.iter().map(|_| Uuid::new_v4()).collect();
        let group_ids: Vec<Uuid> = members.iter().map(|m| m.group_id).collect();
        let emails: Vec<String> = members.iter().map(|m| m.email.clone()).collect();
        let names: Vec<String> = members.iter().map(|m| m.name.clone()).collect();
        let subscribed: Vec<bool> = members.iter().map(|m| m.subscribed).collect();
        let fields: Vec<String> = members
            .iter()
            .map(|m| m.fields.to_string())
            .collect();

        let rows = sqlx::query(
            r#"
            INSERT INTO members (id, group_id, email, name, subscribed, fields)
            SELECT t.id, t.group_id, t.email, t.name, t.subscribed, t.fields::jsonb
            FROM UNNEST($1::uuid[], $2::uuid[], $3::text[], $4::text[], $5::boolean[], $6::text[])
                AS t(id, group_id, email, name, subscribed, fields)
            ON CONFLICT DO NOTHING
            RETURNING lower(email) AS email
            "#,
        )
        .bind(&ids)
        .bind(&group_ids)
        .bind(&emails)
        .bind(&names)
        .bind(&subscribed)
        .bind(&fields)
        .fetch_all(&self.pool)
        .await?;

        let mut inserted: HashSet<String> = HashSet::with_capacity(rows.len());
        for row in &rows {
            inserted.insert(row.try_get::<String, _>("email")?);
        }

        // Classify in input order. A duplicated email within the same batch
        // is only inserted once; later occurrences report Duplicate.
        let outcomes = members
            .iter()
            .map(|m| {
                if inserted.remove(&m.email.to_lowercase()) {
                    InsertOutcome::Inserted
                } else {
                    InsertOutcome::Duplicate
                }
            })
            .collect();

        Ok(outcomes)
    }

    async fn count_members(&self, group_id: Uuid) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM members WHERE group_id = $1",
        )
        .bind(group_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count as u64)
    }

    async fn list_members(
        &self,
        group_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Member>, u64), StoreError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM members WHERE group_id = $1",
        )
        .bind(group_id)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query(
            r#"
            SELECT id, group_id, email, name, subscribed, fields, created_at
            FROM members
            WHERE group_id = $1
            ORDER BY created_at, email
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(group_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let members = rows
            .iter()
            .map(member_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((members, total as u64))
    }
}
