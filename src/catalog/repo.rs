use async_trait::async_trait;
use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{db::PgStore, scope::Scope};

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BodyPart {
    pub id: Uuid,
    pub owner_id: Uuid,
    #[serde(rename = "scopeId")]
    pub group_id: Option<Uuid>,
    pub name: String,
    pub day: String, // weekday label, display only
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: Uuid,
    pub owner_id: Uuid,
    #[serde(rename = "scopeId")]
    pub group_id: Option<Uuid>,
    pub body_part_id: Uuid,
    pub body_part_name: String,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl BodyPart {
    pub fn scope(&self) -> Scope {
        Scope::from(self.group_id)
    }
}

impl Exercise {
    pub fn scope(&self) -> Scope {
        Scope::from(self.group_id)
    }
}

/// Read/write access to the catalog.
///
/// Lookups take the acting user and a scope: the personal scope matches only
/// records the actor owns, a group scope matches every record of that group.
#[async_trait]
pub trait CatalogRepo: Send + Sync {
    async fn insert_body_part(&self, body_part: &BodyPart) -> anyhow::Result<()>;
    async fn insert_exercise(&self, exercise: &Exercise) -> anyhow::Result<()>;
    async fn find_body_part(
        &self,
        actor_id: Uuid,
        scope: Scope,
        id: Uuid,
    ) -> anyhow::Result<Option<BodyPart>>;
    async fn find_exercise(
        &self,
        actor_id: Uuid,
        scope: Scope,
        id: Uuid,
    ) -> anyhow::Result<Option<Exercise>>;
    /// Sorted by name.
    async fn list_body_parts(&self, actor_id: Uuid, scope: Scope) -> anyhow::Result<Vec<BodyPart>>;
    /// Sorted by name.
    async fn list_exercises(&self, actor_id: Uuid, scope: Scope) -> anyhow::Result<Vec<Exercise>>;
    /// Deletes a group exercise together with its set logs.
    async fn delete_group_exercise(&self, group_id: Uuid, id: Uuid) -> anyhow::Result<bool>;
}

/// SQL filter for `scope` on table alias `t`, using one bind at position `n`.
fn scope_filter(scope: Scope, t: &str, n: usize) -> String {
    match scope {
        Scope::Personal => format!("{t}.group_id IS NULL AND {t}.owner_id = ${n}"),
        Scope::Group(_) => format!("{t}.group_id = ${n}"),
    }
}

/// Value bound for `scope_filter`.
fn scope_bind(actor_id: Uuid, scope: Scope) -> Uuid {
    scope.group_id().unwrap_or(actor_id)
}

const EXERCISE_SELECT: &str = "SELECT e.id, e.owner_id, e.group_id, e.body_part_id, \
     b.name AS body_part_name, e.name, e.created_at \
     FROM exercises e JOIN body_parts b ON b.id = e.body_part_id";

#[async_trait]
impl CatalogRepo for PgStore {
    async fn insert_body_part(&self, bp: &BodyPart) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO body_parts (id, owner_id, group_id, name, day, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(bp.id)
        .bind(bp.owner_id)
        .bind(bp.group_id)
        .bind(&bp.name)
        .bind(&bp.day)
        .bind(bp.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_exercise(&self, ex: &Exercise) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO exercises (id, owner_id, group_id, body_part_id, name, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(ex.id)
        .bind(ex.owner_id)
        .bind(ex.group_id)
        .bind(ex.body_part_id)
        .bind(&ex.name)
        .bind(ex.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_body_part(
        &self,
        actor_id: Uuid,
        scope: Scope,
        id: Uuid,
    ) -> anyhow::Result<Option<BodyPart>> {
        let sql = format!(
            "SELECT b.id, b.owner_id, b.group_id, b.name, b.day, b.created_at \
             FROM body_parts b WHERE b.id = $1 AND {}",
            scope_filter(scope, "b", 2)
        );
        let row = sqlx::query_as::<_, BodyPart>(&sql)
            .bind(id)
            .bind(scope_bind(actor_id, scope))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_exercise(
        &self,
        actor_id: Uuid,
        scope: Scope,
        id: Uuid,
    ) -> anyhow::Result<Option<Exercise>> {
        let sql = format!(
            "{EXERCISE_SELECT} WHERE e.id = $1 AND {}",
            scope_filter(scope, "e", 2)
        );
        let row = sqlx::query_as::<_, Exercise>(&sql)
            .bind(id)
            .bind(scope_bind(actor_id, scope))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_body_parts(&self, actor_id: Uuid, scope: Scope) -> anyhow::Result<Vec<BodyPart>> {
        let sql = format!(
            "SELECT b.id, b.owner_id, b.group_id, b.name, b.day, b.created_at \
             FROM body_parts b WHERE {} ORDER BY b.name ASC",
            scope_filter(scope, "b", 1)
        );
        let rows = sqlx::query_as::<_, BodyPart>(&sql)
            .bind(scope_bind(actor_id, scope))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn list_exercises(&self, actor_id: Uuid, scope: Scope) -> anyhow::Result<Vec<Exercise>> {
        let sql = format!(
            "{EXERCISE_SELECT} WHERE {} ORDER BY e.name ASC",
            scope_filter(scope, "e", 1)
        );
        let rows = sqlx::query_as::<_, Exercise>(&sql)
            .bind(scope_bind(actor_id, scope))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn delete_group_exercise(&self, group_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        // set_logs cascade on the exercise foreign key
        let res = sqlx::query("DELETE FROM exercises WHERE id = $1 AND group_id = $2")
            .bind(id)
            .bind(group_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() == 1)
    }
}
