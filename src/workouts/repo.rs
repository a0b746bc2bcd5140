use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{days::DayKey, db::PgStore, scope::Scope};

/// One recorded working set. Immutable once admitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetLogEntry {
    pub id: Uuid,
    pub actor_id: Uuid,
    #[serde(rename = "scopeId")]
    pub scope: Scope,
    pub exercise_id: Uuid,
    pub set_number: i32,
    pub weight_kg: f64,
    pub reps: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub performed_at: OffsetDateTime,
}

/// A set waiting for admission; the ledger assigns id and set number.
#[derive(Debug, Clone)]
pub struct NewSetLog {
    pub actor_id: Uuid,
    pub exercise_id: Uuid,
    pub scope: Scope,
    pub weight_kg: f64,
    pub reps: i32,
    pub performed_at: OffsetDateTime,
}

impl NewSetLog {
    pub fn into_entry(self, set_number: i32) -> SetLogEntry {
        SetLogEntry {
            id: Uuid::new_v4(),
            actor_id: self.actor_id,
            scope: self.scope,
            exercise_id: self.exercise_id,
            set_number,
            weight_kg: self.weight_kg,
            reps: self.reps,
            performed_at: self.performed_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    Admitted(SetLogEntry),
    LimitReached,
}

#[async_trait]
pub trait SetLogRepo: Send + Sync {
    /// Counts the entries of (actor, exercise, scope) on `day` and, if fewer
    /// than `cap`, appends `new` with the next set number. Count and append
    /// are one step per key: concurrent calls never exceed `cap`.
    async fn append_capped(&self, new: NewSetLog, day: DayKey, cap: usize) -> anyhow::Result<Admission>;

    /// The actor's entries for one exercise in `scope`, ordered by
    /// (performed_at desc, set_number desc), then paged.
    async fn list_for_actor(
        &self,
        actor_id: Uuid,
        scope: Scope,
        exercise_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> anyhow::Result<Vec<SetLogEntry>>;

    /// Every entry of one exercise in `scope`, same ordering, unpaged.
    async fn list_for_exercise(&self, scope: Scope, exercise_id: Uuid) -> anyhow::Result<Vec<SetLogEntry>>;
}

#[derive(Debug, FromRow)]
struct SetLogRow {
    id: Uuid,
    user_id: Uuid,
    group_id: Option<Uuid>,
    exercise_id: Uuid,
    set_number: i32,
    weight_kg: f64,
    reps: i32,
    performed_at: OffsetDateTime,
}

impl From<SetLogRow> for SetLogEntry {
    fn from(r: SetLogRow) -> Self {
        Self {
            id: r.id,
            actor_id: r.user_id,
            scope: Scope::from(r.group_id),
            exercise_id: r.exercise_id,
            set_number: r.set_number,
            weight_kg: r.weight_kg,
            reps: r.reps,
            performed_at: r.performed_at,
        }
    }
}

const SET_COLUMNS: &str =
    "id, user_id, group_id, exercise_id, set_number, weight_kg, reps, performed_at";

/// Advisory-lock name for one daily slot key.
fn slot_lock_key(new: &NewSetLog, day: DayKey) -> String {
    let scope = new
        .scope
        .group_id()
        .map_or_else(|| "personal".to_string(), |g| g.to_string());
    format!("set-slot:{}:{}:{}:{}", new.actor_id, new.exercise_id, scope, day)
}

#[async_trait]
impl SetLogRepo for PgStore {
    async fn append_capped(&self, new: NewSetLog, day: DayKey, cap: usize) -> anyhow::Result<Admission> {
        let mut tx = self.pool.begin().await.context("begin admission tx")?;

        // serializes admissions for the same key until commit
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(slot_lock_key(&new, day))
            .execute(&mut *tx)
            .await
            .context("lock daily slot")?;

        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM set_logs
            WHERE user_id = $1 AND exercise_id = $2
              AND group_id IS NOT DISTINCT FROM $3 AND day_key = $4
            "#,
        )
        .bind(new.actor_id)
        .bind(new.exercise_id)
        .bind(new.scope.group_id())
        .bind(day.date())
        .fetch_one(&mut *tx)
        .await
        .context("count daily sets")?;

        if count as usize >= cap {
            tx.rollback().await?;
            return Ok(Admission::LimitReached);
        }

        let entry = new.into_entry(count as i32 + 1);
        sqlx::query(
            r#"
            INSERT INTO set_logs (id, user_id, group_id, exercise_id, set_number,
                                  weight_kg, reps, performed_at, day_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(entry.id)
        .bind(entry.actor_id)
        .bind(entry.scope.group_id())
        .bind(entry.exercise_id)
        .bind(entry.set_number)
        .bind(entry.weight_kg)
        .bind(entry.reps)
        .bind(entry.performed_at)
        .bind(day.date())
        .execute(&mut *tx)
        .await
        .context("insert set log")?;

        tx.commit().await.context("commit admission")?;
        Ok(Admission::Admitted(entry))
    }

    async fn list_for_actor(
        &self,
        actor_id: Uuid,
        scope: Scope,
        exercise_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> anyhow::Result<Vec<SetLogEntry>> {
        let rows = sqlx::query_as::<_, SetLogRow>(&format!(
            r#"
            SELECT {SET_COLUMNS} FROM set_logs
            WHERE user_id = $1 AND exercise_id = $2 AND group_id IS NOT DISTINCT FROM $3
            ORDER BY performed_at DESC, set_number DESC
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(actor_id)
        .bind(exercise_id)
        .bind(scope.group_id())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(SetLogEntry::from).collect())
    }

    async fn list_for_exercise(&self, scope: Scope, exercise_id: Uuid) -> anyhow::Result<Vec<SetLogEntry>> {
        let rows = sqlx::query_as::<_, SetLogRow>(&format!(
            r#"
            SELECT {SET_COLUMNS} FROM set_logs
            WHERE exercise_id = $1 AND group_id IS NOT DISTINCT FROM $2
            ORDER BY performed_at DESC, set_number DESC
            "#
        ))
        .bind(exercise_id)
        .bind(scope.group_id())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(SetLogEntry::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::days::day_key;
    use time::macros::datetime;

    fn new_set(scope: Scope) -> NewSetLog {
        NewSetLog {
            actor_id: Uuid::nil(),
            exercise_id: Uuid::nil(),
            scope,
            weight_kg: 40.0,
            reps: 10,
            performed_at: datetime!(2024-01-01 10:00 +05:30),
        }
    }

    #[test]
    fn lock_keys_differ_per_scope_and_day() {
        let day = day_key(datetime!(2024-01-01 10:00 +05:30));
        let next = day_key(datetime!(2024-01-02 10:00 +05:30));
        let personal = slot_lock_key(&new_set(Scope::Personal), day);
        let group = slot_lock_key(&new_set(Scope::Group(Uuid::new_v4())), day);
        assert_ne!(personal, group);
        assert_ne!(personal, slot_lock_key(&new_set(Scope::Personal), next));
        assert!(personal.ends_with(":personal:2024-01-01"));
    }
}
