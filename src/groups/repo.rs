use async_trait::async_trait;
use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::PgStore;

/// A gym room: owner, members (owner included) and emails invited before they registered.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub member_ids: Vec<Uuid>,
    pub pending_invites: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Group {
    pub fn new(name: impl Into<String>, owner_id: Uuid, now: OffsetDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            owner_id,
            member_ids: vec![owner_id],
            pending_invites: Vec::new(),
            created_at: now,
        }
    }
}

#[async_trait]
pub trait GroupRepo: Send + Sync {
    /// Stores the group with its initial members.
    async fn insert(&self, group: &Group) -> anyhow::Result<()>;
    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Group>>;
    /// Groups the user owns or belongs to, newest first.
    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Group>>;
    /// No-op if already a member.
    async fn add_member(&self, group_id: Uuid, user_id: Uuid) -> anyhow::Result<()>;
    /// No-op if already pending.
    async fn add_pending_invite(&self, group_id: Uuid, email: &str) -> anyhow::Result<()>;
    async fn remove_member(&self, group_id: Uuid, user_id: Uuid) -> anyhow::Result<bool>;
    /// Removes the group with its catalog and set logs.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}

const GROUP_SELECT: &str = r#"
    SELECT g.id, g.name, g.owner_id, g.created_at,
           ARRAY(SELECT m.user_id FROM group_members m
                 WHERE m.group_id = g.id ORDER BY m.joined_at) AS member_ids,
           ARRAY(SELECT i.email FROM group_invites i
                 WHERE i.group_id = g.id ORDER BY i.created_at) AS pending_invites
    FROM groups g
"#;

#[async_trait]
impl GroupRepo for PgStore {
    async fn insert(&self, group: &Group) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("INSERT INTO groups (id, name, owner_id, created_at) VALUES ($1, $2, $3, $4)")
            .bind(group.id)
            .bind(&group.name)
            .bind(group.owner_id)
            .bind(group.created_at)
            .execute(&mut *tx)
            .await?;
        for member in &group.member_ids {
            sqlx::query(
                "INSERT INTO group_members (group_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(group.id)
            .bind(member)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Group>> {
        let group = sqlx::query_as::<_, Group>(&format!("{GROUP_SELECT} WHERE g.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(group)
    }

    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Group>> {
        let groups = sqlx::query_as::<_, Group>(&format!(
            "{GROUP_SELECT} WHERE g.owner_id = $1 OR EXISTS (\
                 SELECT 1 FROM group_members m WHERE m.group_id = g.id AND m.user_id = $1) \
             ORDER BY g.created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(groups)
    }

    async fn add_member(&self, group_id: Uuid, user_id: Uuid) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO group_members (group_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(group_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn add_pending_invite(&self, group_id: Uuid, email: &str) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO group_invites (group_id, email) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(group_id)
        .bind(email)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_member(&self, group_id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM group_members WHERE group_id = $1 AND user_id = $2")
            .bind(group_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() == 1)
    }
}
