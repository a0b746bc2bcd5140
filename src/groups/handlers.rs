use axum::{extract::State, http::StatusCode};
use time::OffsetDateTime;
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{CreateGroupRequest, GroupView, InviteRequest, InviteResponse},
    guard,
    invites::invite_members,
    overview::{group_exercise_overview, GroupExerciseOverview},
    repo::Group,
    service,
};
use crate::{
    auth::{dto::MessageResponse, AuthUser},
    catalog::{
        dto::{BodyPartWithExercises, CreateBodyPartRequest, CreateExerciseRequest},
        service as catalog_service, BodyPart, Exercise,
    },
    error::AppResult,
    extract::{Json, Path},
    scope::Scope,
    state::AppState,
    workouts::{dto::LogSetRequest, ledger::admit_authorized, SetLogEntry},
};

#[instrument(skip(state, req))]
pub async fn create_group(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<CreateGroupRequest>,
) -> AppResult<(StatusCode, Json<Group>)> {
    let group = service::create_group(&*state.groups, user_id, req, OffsetDateTime::now_utc()).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

#[instrument(skip(state))]
pub async fn list_groups(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<GroupView>>> {
    Ok(Json(service::list_groups(&*state.groups, &*state.users, user_id).await?))
}

#[instrument(skip(state, req))]
pub async fn invite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(group_id): Path<Uuid>,
    Json(req): Json<InviteRequest>,
) -> AppResult<Json<InviteResponse>> {
    let results = invite_members(
        &*state.groups,
        &*state.users,
        &*state.notifier,
        &state.config.invite_register_url,
        group_id,
        user_id,
        req,
    )
    .await?;
    Ok(Json(InviteResponse {
        message: "Invites processed".into(),
        group_id,
        results,
    }))
}

#[instrument(skip(state))]
pub async fn remove_member(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((group_id, member_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<MessageResponse>> {
    service::remove_member(&*state.groups, group_id, user_id, member_id).await?;
    Ok(Json(MessageResponse::new("Member removed from group successfully")))
}

#[instrument(skip(state))]
pub async fn delete_group(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(group_id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    service::delete_group(&*state.groups, group_id, user_id).await?;
    Ok(Json(MessageResponse::new("Group deleted successfully")))
}

#[instrument(skip(state, req))]
pub async fn create_body_part(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(group_id): Path<Uuid>,
    Json(req): Json<CreateBodyPartRequest>,
) -> AppResult<(StatusCode, Json<BodyPart>)> {
    let body_part = catalog_service::create_body_part(
        &*state.catalog,
        &*state.groups,
        user_id,
        Scope::Group(group_id),
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
    Path(group_id): Path<Uuid>,
    Json(req): Json<CreateExerciseRequest>,
) -> AppResult<(StatusCode, Json<Exercise>)> {
    let exercise = catalog_service::create_exercise(
        &*state.catalog,
        &*state.groups,
        user_id,
        Scope::Group(group_id),
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
    Path(group_id): Path<Uuid>,
) -> AppResult<Json<Vec<BodyPartWithExercises>>> {
    let listing = catalog_service::body_parts_with_exercises(
        &*state.catalog,
        &*state.groups,
        user_id,
        Scope::Group(group_id),
    )
    .await?;
    Ok(Json(listing))
}

#[instrument(skip(state, req))]
pub async fn log_set(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(group_id): Path<Uuid>,
    Json(req): Json<LogSetRequest>,
) -> AppResult<(StatusCode, Json<SetLogEntry>)> {
    let scope = Scope::Group(group_id);
    guard::require_member(&*state.groups, group_id, user_id).await?;
    let input = req.into_input()?;
    catalog_service::require_exercise(&*state.catalog, user_id, scope, input.exercise_id).await?;
    let entry = admit_authorized(&*state.sets, user_id, scope, input, OffsetDateTime::now_utc()).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[instrument(skip(state))]
pub async fn exercise_overview(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((group_id, exercise_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<GroupExerciseOverview>> {
    let overview = group_exercise_overview(
        &*state.groups,
        &*state.catalog,
        &*state.sets,
        &*state.users,
        group_id,
        exercise_id,
        user_id,
    )
    .await?;
    Ok(Json(overview))
}

#[instrument(skip(state))]
pub async fn delete_exercise(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((group_id, exercise_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<MessageResponse>> {
    service::delete_group_exercise(&*state.groups, &*state.catalog, group_id, user_id, exercise_id)
        .await?;
    Ok(Json(MessageResponse::new("Exercise and its logs deleted successfully")))
}
