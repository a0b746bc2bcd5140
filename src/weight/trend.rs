//! Weight log, BMI and the first-to-last trend.

use serde::Serialize;
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use super::repo::{WeightLogEntry, WeightRepo};
use crate::error::{AppError, AppResult};

/// `weight / height_m²`, rounded to one decimal.
pub fn bmi(weight_kg: f64, height_cm: f64) -> AppResult<f64> {
    if !(height_cm.is_finite() && height_cm > 0.0) {
        return Err(AppError::validation("Height must be set to compute BMI"));
    }
    let meters = height_cm / 100.0;
    Ok((weight_kg / (meters * meters) * 10.0).round() / 10.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trend {
    pub value: f64,
    pub direction: TrendDirection,
}

/// Difference between the last and first entry; intermediate entries are ignored.
pub fn trend(logs: &[WeightLogEntry]) -> Option<Trend> {
    let (first, last) = (logs.first()?, logs.last()?);
    let value = last.weight_kg - first.weight_kg;
    let direction = if value > 0.0 {
        TrendDirection::Up
    } else if value < 0.0 {
        TrendDirection::Down
    } else {
        TrendDirection::Stable
    };
    Some(Trend { value, direction })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightHistory {
    pub logs: Vec<WeightLogEntry>,
    pub trend: Option<Trend>,
}

#[instrument(skip(weights))]
pub async fn record_weight(
    weights: &dyn WeightRepo,
    actor_id: Uuid,
    weight_kg: f64,
    height_cm: f64,
    now: OffsetDateTime,
) -> AppResult<WeightLogEntry> {
    if !(weight_kg.is_finite() && weight_kg > 0.0) {
        return Err(AppError::validation("Weight must be a positive number"));
    }
    let entry = WeightLogEntry {
        id: Uuid::new_v4(),
        actor_id,
        weight_kg,
        bmi: bmi(weight_kg, height_cm)?,
        recorded_at: now,
    };
    weights.append(&entry).await?;
    info!(bmi = entry.bmi, "weight recorded");
    Ok(entry)
}

pub async fn weight_history(weights: &dyn WeightRepo, actor_id: Uuid) -> AppResult<WeightHistory> {
    let logs = weights.list_ascending(actor_id).await?;
    let trend = trend(&logs);
    Ok(WeightHistory { logs, trend })
}
