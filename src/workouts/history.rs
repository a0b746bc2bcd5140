//! Personal exercise history: page raw entries, then group the page by day.

use std::collections::BTreeMap;

use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::repo::{SetLogEntry, SetLogRepo};
use crate::{
    catalog::CatalogRepo,
    days::{day_key, DayKey},
    error::AppResult,
    paging::Page,
    scope::Scope,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySet {
    pub set_number: i32,
    pub weight_kg: f64,
    pub reps: i32,
    #[serde(rename = "date", with = "time::serde::rfc3339")]
    pub performed_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryDay {
    pub date: DayKey,
    pub sets: Vec<HistorySet>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPage {
    pub exercise_name: Option<String>,
    pub body_part_name: Option<String>,
    pub sets_count: usize,
    pub average_weight_kg: f64,
    pub days: Vec<HistoryDay>,
}

/// Returned when the requested page holds no entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmptyHistory {
    pub exercise_name: Option<String>,
    pub body_part_name: Option<String>,
    pub sets_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExerciseHistory {
    Empty(EmptyHistory),
    Page(HistoryPage),
}

impl ExerciseHistory {
    fn empty() -> Self {
        ExerciseHistory::Empty(EmptyHistory {
            exercise_name: None,
            body_part_name: None,
            sets_count: 0,
        })
    }
}

/// Groups already ordered entries by local day, newest day first. Entries
/// keep their input order inside a day.
pub fn group_by_day(entries: &[SetLogEntry]) -> Vec<HistoryDay> {
    let mut days: BTreeMap<DayKey, Vec<HistorySet>> = BTreeMap::new();
    for e in entries {
        days.entry(day_key(e.performed_at)).or_default().push(HistorySet {
            set_number: e.set_number,
            weight_kg: e.weight_kg,
            reps: e.reps,
            performed_at: e.performed_at,
        });
    }
    days.into_iter()
        .rev()
        .map(|(date, sets)| HistoryDay { date, sets })
        .collect()
}

fn average_weight(entries: &[SetLogEntry]) -> f64 {
    if entries.is_empty() {
        return 0.0;
    }
    entries.iter().map(|e| e.weight_kg).sum::<f64>() / entries.len() as f64
}

/// The actor's personal sets for one exercise. Paging runs over raw entries,
/// so one day may be split across pages; the average covers the page only.
#[instrument(skip(sets, catalog))]
pub async fn exercise_history(
    sets: &dyn SetLogRepo,
    catalog: &dyn CatalogRepo,
    actor_id: Uuid,
    exercise_id: Uuid,
    page: Page,
) -> AppResult<ExerciseHistory> {
    let entries = sets
        .list_for_actor(actor_id, Scope::Personal, exercise_id, page.offset(), page.limit)
        .await?;
    if entries.is_empty() {
        debug!("no history on this page");
        return Ok(ExerciseHistory::empty());
    }

    let exercise = catalog
        .find_exercise(actor_id, Scope::Personal, exercise_id)
        .await?;
    let (exercise_name, body_part_name) = match exercise {
        Some(ex) => (Some(ex.name), Some(ex.body_part_name)),
        None => (None, None),
    };

    Ok(ExerciseHistory::Page(HistoryPage {
        exercise_name,
        body_part_name,
        sets_count: entries.len(),
        average_weight_kg: average_weight(&entries),
        days: group_by_day(&entries),
    }))
}
