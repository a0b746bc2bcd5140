use serde::{Deserialize, Serialize};

use super::repo::WeightLogEntry;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddWeightRequest {
    #[serde(alias = "weight")]
    pub weight_kg: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightRecorded {
    pub message: String,
    pub weight_kg: f64,
    pub bmi: f64,
    pub log: WeightLogEntry,
}
