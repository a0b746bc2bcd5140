use async_trait::async_trait;
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::{db::PgStore, weight::WeightLogEntry};

/// Account record, including the denormalized current weight and BMI.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String, // argon2, never serialized
    pub gender: String,
    pub date_of_birth: Date,
    pub age: i32,
    pub height_cm: f64,
    pub current_weight_kg: f64,
    pub current_bmi: f64,
    pub gym_timing: String,
    pub image_url: Option<String>,
    pub created_at: OffsetDateTime,
}

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn find_many(&self, ids: &[Uuid]) -> anyhow::Result<Vec<User>>;
    /// Creates the account with its seed weight log and turns pending invites
    /// for its email into membership, all or nothing. Returns the joined group
    /// ids, or `None` without writing when the email is already registered.
    async fn register(&self, user: &User, seed: &WeightLogEntry) -> anyhow::Result<Option<Vec<Uuid>>>;
    /// Persists name, gender, height, gym timing and current BMI.
    async fn update_profile(&self, user: &User) -> anyhow::Result<()>;
    /// Removes the account, its personal data and the groups it owns.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}

const USER_COLUMNS: &str = "id, name, email, password_hash, gender, date_of_birth, age, height_cm, \
     current_weight_kg, current_bmi, gym_timing, image_url, created_at";

#[async_trait]
impl UserRepo for PgStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_many(&self, ids: &[Uuid]) -> anyhow::Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn register(&self, user: &User, seed: &WeightLogEntry) -> anyhow::Result<Option<Vec<Uuid>>> {
        let mut tx = self.pool.begin().await?;
        let res = sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, gender, date_of_birth, age,
                               height_cm, current_weight_kg, current_bmi, gym_timing,
                               image_url, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.gender)
        .bind(user.date_of_birth)
        .bind(user.age)
        .bind(user.height_cm)
        .bind(user.current_weight_kg)
        .bind(user.current_bmi)
        .bind(&user.gym_timing)
        .bind(&user.image_url)
        .bind(user.created_at)
        .execute(&mut *tx)
        .await?;
        if res.rows_affected() != 1 {
            tx.rollback().await?;
            return Ok(None);
        }

        sqlx::query(
            r#"
            INSERT INTO weight_logs (id, user_id, weight_kg, bmi, recorded_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(seed.id)
        .bind(user.id)
        .bind(seed.weight_kg)
        .bind(seed.bmi)
        .bind(seed.recorded_at)
        .execute(&mut *tx)
        .await?;

        let joined = sqlx::query_scalar::<_, Uuid>(
            r#"
            WITH accepted AS (
                DELETE FROM group_invites WHERE email = $1 RETURNING group_id
            )
            INSERT INTO group_members (group_id, user_id)
            SELECT group_id, $2 FROM accepted
            ON CONFLICT DO NOTHING
            RETURNING group_id
            "#,
        )
        .bind(&user.email)
        .bind(user.id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(joined))
    }

    async fn update_profile(&self, user: &User) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET name = $2, gender = $3, height_cm = $4, gym_timing = $5, current_bmi = $6
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.gender)
        .bind(user.height_cm)
        .bind(&user.gym_timing)
        .bind(user.current_bmi)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;
        // personal catalog; exercises and their sets cascade from body parts
        sqlx::query("DELETE FROM body_parts WHERE owner_id = $1 AND group_id IS NULL")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        // foreign keys cascade to logs, memberships and owned groups
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(res.rows_affected() == 1)
    }
}
