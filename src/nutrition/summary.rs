//! Calories per local day, and the average over days with at least one entry.

use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

use super::repo::{NutritionEntry, NutritionRepo};
use crate::{
    days::{day_key, DayKey},
    error::AppResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCalories {
    pub date: DayKey,
    pub total_calories: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalorieSummary {
    pub average_daily_calories: f64,
    pub daily_calorie_intake: Vec<DailyCalories>,
}

/// Sums calories by the local day of `created_at`, oldest day first.
pub fn daily_totals(entries: &[NutritionEntry]) -> Vec<DailyCalories> {
    let mut totals: BTreeMap<DayKey, f64> = BTreeMap::new();
    for e in entries {
        *totals.entry(day_key(e.created_at)).or_default() += e.calories;
    }
    totals
        .into_iter()
        .map(|(date, total_calories)| DailyCalories {
            date,
            total_calories,
        })
        .collect()
}

/// Days without entries do not count towards the average.
pub fn summarize(entries: &[NutritionEntry]) -> CalorieSummary {
    let daily = daily_totals(entries);
    let average = if daily.is_empty() {
        0.0
    } else {
        daily.iter().map(|d| d.total_calories).sum::<f64>() / daily.len() as f64
    };
    CalorieSummary {
        average_daily_calories: average,
        daily_calorie_intake: daily,
    }
}

pub async fn daily_calorie_summary(
    nutrition: &dyn NutritionRepo,
    actor_id: Uuid,
) -> AppResult<Vec<DailyCalories>> {
    Ok(daily_totals(&nutrition.list_all(actor_id).await?))
}

pub async fn profile_calorie_summary(
    nutrition: &dyn NutritionRepo,
    actor_id: Uuid,
) -> AppResult<CalorieSummary> {
    Ok(summarize(&nutrition.list_all(actor_id).await?))
}
