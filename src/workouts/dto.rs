use serde::Deserialize;
use uuid::Uuid;

use super::ledger::SetInput;
use crate::error::{AppError, AppResult};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogSetRequest {
    pub exercise_id: Option<Uuid>,
    pub weight_kg: Option<f64>,
    pub reps: Option<i32>,
}

impl LogSetRequest {
    pub fn into_input(self) -> AppResult<SetInput> {
        match (self.exercise_id, self.weight_kg, self.reps) {
            (Some(exercise_id), Some(weight_kg), Some(reps)) => Ok(SetInput {
                exercise_id,
                weight_kg,
                reps,
            }),
            _ => Err(AppError::validation(
                "'exerciseId', 'weightKg' and 'reps' are required",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_fields_are_required() {
        let req: LogSetRequest =
            serde_json::from_str(r#"{"exerciseId":"6f1c1a6e-3f0e-4a43-9a5e-1d2f4b7a9c10","reps":5}"#)
                .unwrap();
        assert!(matches!(req.into_input(), Err(AppError::Validation(_))));

        let req: LogSetRequest = serde_json::from_str(
            r#"{"exerciseId":"6f1c1a6e-3f0e-4a43-9a5e-1d2f4b7a9c10","weightKg":20.5,"reps":5}"#,
        )
        .unwrap();
        let input = req.into_input().unwrap();
        assert_eq!(input.reps, 5);
        assert_eq!(input.weight_kg, 20.5);
    }
}
