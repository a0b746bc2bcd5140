use async_trait::async_trait;
use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::PgStore;

/// One weight submission; append-only.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WeightLogEntry {
    pub id: Uuid,
    #[sqlx(rename = "user_id")]
    pub actor_id: Uuid,
    pub weight_kg: f64,
    pub bmi: f64,
    #[serde(rename = "date", with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
}

#[async_trait]
pub trait WeightRepo: Send + Sync {
    /// Appends the entry and makes it the user's current weight and BMI.
    async fn append(&self, entry: &WeightLogEntry) -> anyhow::Result<()>;
    /// All entries of the actor, oldest first.
    async fn list_ascending(&self, actor_id: Uuid) -> anyhow::Result<Vec<WeightLogEntry>>;
}

#[async_trait]
impl WeightRepo for PgStore {
    async fn append(&self, entry: &WeightLogEntry) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO weight_logs (id, user_id, weight_kg, bmi, recorded_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(entry.id)
        .bind(entry.actor_id)
        .bind(entry.weight_kg)
        .bind(entry.bmi)
        .bind(entry.recorded_at)
        .execute(&mut *tx)
        .await?;
        sqlx::query("UPDATE users SET current_weight_kg = $2, current_bmi = $3 WHERE id = $1")
            .bind(entry.actor_id)
            .bind(entry.weight_kg)
            .bind(entry.bmi)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn list_ascending(&self, actor_id: Uuid) -> anyhow::Result<Vec<WeightLogEntry>> {
        let rows = sqlx::query_as::<_, WeightLogEntry>(
            r#"
            SELECT id, user_id, weight_kg, bmi, recorded_at
            FROM weight_logs
            WHERE user_id = $1
            ORDER BY recorded_at ASC, id ASC
            "#,
        )
        .bind(actor_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
