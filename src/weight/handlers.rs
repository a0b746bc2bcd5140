use axum::{extract::State, http::StatusCode};
use time::OffsetDateTime;
use tracing::instrument;

use super::{
    dto::{AddWeightRequest, WeightRecorded},
    trend::{record_weight, weight_history, WeightHistory},
};
use crate::{
    auth::AuthUser,
    error::{AppError, AppResult},
    extract::Json,
    state::AppState,
};

#[instrument(skip(state, req))]
pub async fn add_weight(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<AddWeightRequest>,
) -> AppResult<(StatusCode, Json<WeightRecorded>)> {
    let weight_kg = req
        .weight_kg
        .ok_or_else(|| AppError::validation("Weight is required"))?;
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let log = record_weight(
        &*state.weights,
        user_id,
        weight_kg,
        user.height_cm,
        OffsetDateTime::now_utc(),
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(WeightRecorded {
            message: "Weight added successfully".into(),
            weight_kg: log.weight_kg,
            bmi: log.bmi,
            log,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn weight_log(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<WeightHistory>> {
    Ok(Json(weight_history(&*state.weights, user_id).await?))
}
