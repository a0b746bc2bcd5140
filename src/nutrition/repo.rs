use std::{fmt, str::FromStr};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::PgStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    MidMeal,
    Lunch,
    EveningSnack,
    Dinner,
    PreWorkout,
    PostWorkout,
}

impl MealType {
    pub fn as_str(self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::MidMeal => "mid_meal",
            MealType::Lunch => "lunch",
            MealType::EveningSnack => "evening_snack",
            MealType::Dinner => "dinner",
            MealType::PreWorkout => "pre_workout",
            MealType::PostWorkout => "post_workout",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "breakfast" => MealType::Breakfast,
            "mid_meal" => MealType::MidMeal,
            "lunch" => MealType::Lunch,
            "evening_snack" => MealType::EveningSnack,
            "dinner" => MealType::Dinner,
            "pre_workout" => MealType::PreWorkout,
            "post_workout" => MealType::PostWorkout,
            other => anyhow::bail!("unknown meal type {other:?}"),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionEntry {
    pub id: Uuid,
    pub actor_id: Uuid,
    pub food_name: String,
    pub calories: f64,
    pub quantity: f64,
    /// Free-text local time the food was eaten, as entered.
    pub time: String,
    pub meal_type: MealType,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[async_trait]
pub trait NutritionRepo: Send + Sync {
    async fn insert_entry(&self, entry: &NutritionEntry) -> anyhow::Result<()>;
    async fn find_entry(&self, actor_id: Uuid, id: Uuid) -> anyhow::Result<Option<NutritionEntry>>;
    /// Newest first.
    async fn list_page(&self, actor_id: Uuid, offset: i64, limit: i64) -> anyhow::Result<Vec<NutritionEntry>>;
    /// Oldest first.
    async fn list_all(&self, actor_id: Uuid) -> anyhow::Result<Vec<NutritionEntry>>;
    /// Overwrites the editable fields; `false` if the actor has no such entry.
    async fn update_entry(&self, entry: &NutritionEntry) -> anyhow::Result<bool>;
    async fn delete_entry(&self, actor_id: Uuid, id: Uuid) -> anyhow::Result<bool>;
}

#[derive(Debug, FromRow)]
struct NutritionRow {
    id: Uuid,
    user_id: Uuid,
    food_name: String,
    calories: f64,
    quantity: f64,
    time_label: String,
    meal_type: String,
    created_at: OffsetDateTime,
}

impl TryFrom<NutritionRow> for NutritionEntry {
    type Error = anyhow::Error;

    fn try_from(r: NutritionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            actor_id: r.user_id,
            food_name: r.food_name,
            calories: r.calories,
            quantity: r.quantity,
            time: r.time_label,
            meal_type: r.meal_type.parse()?,
            created_at: r.created_at,
        })
    }
}

fn into_entries(rows: Vec<NutritionRow>) -> anyhow::Result<Vec<NutritionEntry>> {
    rows.into_iter().map(NutritionEntry::try_from).collect()
}

const NUTRITION_COLUMNS: &str =
    "id, user_id, food_name, calories, quantity, time_label, meal_type, created_at";

#[async_trait]
impl NutritionRepo for PgStore {
    async fn insert_entry(&self, e: &NutritionEntry) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO nutrition_entries
                (id, user_id, food_name, calories, quantity, time_label, meal_type, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(e.id)
        .bind(e.actor_id)
        .bind(&e.food_name)
        .bind(e.calories)
        .bind(e.quantity)
        .bind(&e.time)
        .bind(e.meal_type.as_str())
        .bind(e.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_entry(&self, actor_id: Uuid, id: Uuid) -> anyhow::Result<Option<NutritionEntry>> {
        let row = sqlx::query_as::<_, NutritionRow>(&format!(
            "SELECT {NUTRITION_COLUMNS} FROM nutrition_entries WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(actor_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(NutritionEntry::try_from).transpose()
    }

    async fn list_page(&self, actor_id: Uuid, offset: i64, limit: i64) -> anyhow::Result<Vec<NutritionEntry>> {
        let rows = sqlx::query_as::<_, NutritionRow>(&format!(
            r#"
            SELECT {NUTRITION_COLUMNS} FROM nutrition_entries
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(actor_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        into_entries(rows)
    }

    async fn list_all(&self, actor_id: Uuid) -> anyhow::Result<Vec<NutritionEntry>> {
        let rows = sqlx::query_as::<_, NutritionRow>(&format!(
            "SELECT {NUTRITION_COLUMNS} FROM nutrition_entries WHERE user_id = $1 ORDER BY created_at ASC"
        ))
        .bind(actor_id)
        .fetch_all(&self.pool)
        .await?;
        into_entries(rows)
    }

    async fn update_entry(&self, e: &NutritionEntry) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE nutrition_entries
            SET food_name = $3, calories = $4, quantity = $5, time_label = $6, meal_type = $7
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(e.id)
        .bind(e.actor_id)
        .bind(&e.food_name)
        .bind(e.calories)
        .bind(e.quantity)
        .bind(&e.time)
        .bind(e.meal_type.as_str())
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn delete_entry(&self, actor_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM nutrition_entries WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(actor_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() == 1)
    }
}
