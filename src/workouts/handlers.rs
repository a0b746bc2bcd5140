use axum::{extract::State, http::StatusCode};
use time::OffsetDateTime;
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::LogSetRequest,
    history::{exercise_history, ExerciseHistory},
    ledger::admit_set,
    repo::SetLogEntry,
};
use crate::{
    auth::AuthUser,
    catalog::{
        dto::{BodyPartWithExercises, CreateBodyPartRequest, CreateExerciseRequest},
        service, BodyPart, Exercise,
    },
    error::AppResult,
    extract::{Json, Path, Query},
    paging::PageQuery,
    scope::Scope,
    state::AppState,
};

#[instrument(skip(state, req))]
pub async fn create_body_part(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<CreateBodyPartRequest>,
) -> AppResult<(StatusCode, Json<BodyPart>)> {
    let body_part = service::create_body_part(
        &*state.catalog,
        &*state.groups,
        user_id,
        Scope::Personal,
        req,
        OffsetDateTime::now_utc(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(body_part)))
}

#[instrument(skip(state, req))]
pub async fn create_exercise(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<CreateExerciseRequest>,
) -> AppResult<(StatusCode, Json<Exercise>)> {
    let exercise = service::create_exercise(
        &*state.catalog,
        &*state.groups,
        user_id,
        Scope::Personal,
        req,
        OffsetDateTime::now_utc(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(exercise)))
}

#[instrument(skip(state))]
pub async fn list_body_parts(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<BodyPartWithExercises>>> {
    let listing =
        service::body_parts_with_exercises(&*state.catalog, &*state.groups, user_id, Scope::Personal)
            .await?;
    Ok(Json(listing))
}

#[instrument(skip(state))]
pub async fn list_exercises(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(body_part_id): Path<Uuid>,
) -> AppResult<Json<Vec<Exercise>>> {
    let exercises =
        service::exercises_for_body_part(&*state.catalog, user_id, Scope::Personal, body_part_id)
            .await?;
    Ok(Json(exercises))
}

#[instrument(skip(state, req))]
pub async fn log_set(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<LogSetRequest>,
) -> AppResult<(StatusCode, Json<SetLogEntry>)> {
    let input = req.into_input()?;
    service::require_exercise(&*state.catalog, user_id, Scope::Personal, input.exercise_id).await?;
    let entry = admit_set(
        &*state.sets,
        &*state.groups,
        user_id,
        Scope::Personal,
        input,
        OffsetDateTime::now_utc(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[instrument(skip(state))]
pub async fn history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(exercise_id): Path<Uuid>,
    Query(q): Query<PageQuery>,
) -> AppResult<Json<ExerciseHistory>> {
    let history =
        exercise_history(&*state.sets, &*state.catalog, user_id, exercise_id, q.into()).await?;
    Ok(Json(history))
}
