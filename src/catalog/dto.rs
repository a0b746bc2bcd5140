use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct CreateBodyPartRequest {
    pub name: Option<String>,
    #[serde(alias = "days")]
    pub day: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExerciseRequest {
    pub body_part_id: Option<Uuid>,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExerciseSummary {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct BodyPartWithExercises {
    pub id: Uuid,
    pub name: String,
    pub day: String,
    pub exercises: Vec<ExerciseSummary>,
}
