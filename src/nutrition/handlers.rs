use axum::{extract::State, http::StatusCode};
use time::OffsetDateTime;
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{CreateNutritionRequest, UpdateNutritionRequest},
    repo::NutritionEntry,
    service,
    summary::{daily_calorie_summary, DailyCalories},
};
use crate::{
    auth::{dto::MessageResponse, AuthUser},
    error::AppResult,
    extract::{Json, Path, Query},
    paging::PageQuery,
    state::AppState,
};

#[instrument(skip(state, req))]
pub async fn create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<CreateNutritionRequest>,
) -> AppResult<(StatusCode, Json<NutritionEntry>)> {
    let new = req.validate()?;
    let entry = service::add_entry(&*state.nutrition, user_id, new, OffsetDateTime::now_utc()).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<PageQuery>,
) -> AppResult<Json<Vec<NutritionEntry>>> {
    Ok(Json(service::list_entries(&*state.nutrition, user_id, q.into()).await?))
}

#[instrument(skip(state, req))]
pub async fn update(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateNutritionRequest>,
) -> AppResult<Json<NutritionEntry>> {
    Ok(Json(service::update_entry(&*state.nutrition, user_id, id, req).await?))
}

#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    service::delete_entry(&*state.nutrition, user_id, id).await?;
    Ok(Json(MessageResponse::new("Nutrition entry deleted")))
}

#[instrument(skip(state))]
pub async fn daily_summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<DailyCalories>>> {
    Ok(Json(daily_calorie_summary(&*state.nutrition, user_id).await?))
}
