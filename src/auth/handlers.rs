use axum::{extract::State, http::StatusCode};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    credentials::{hash_password, normalize_email, verify_password},
    dto::{
        AccountView, AuthResponse, LoginRequest, MessageResponse, PublicUser, RefreshRequest,
        RegisterRequest, UpdateProfileRequest,
    },
    jwt::{AuthUser, JwtKeys},
    repo::User,
};
use crate::{
    error::{AppError, AppResult},
    extract::{Json, Path},
    state::AppState,
    weight::{trend::bmi, WeightLogEntry},
};

fn issue_tokens(keys: &JwtKeys, user: &User) -> AppResult<AuthResponse> {
    Ok(AuthResponse {
        access_token: keys.sign_access(user.id)?,
        refresh_token: keys.sign_refresh(user.id)?,
        user: AccountView::from(user),
    })
}

async fn load_user(state: &AppState, id: Uuid) -> AppResult<User> {
    state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))
}

/// Creates the account, seeds its weight log and joins any groups that
/// invited this email before it was registered.
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let reg = payload.validate()?;

    if state.users.find_by_email(&reg.email).await?.is_some() {
        warn!(email = %reg.email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let now = OffsetDateTime::now_utc();
    let current_bmi = bmi(reg.weight_kg, reg.height_cm)?;
    let user = User {
        id: Uuid::new_v4(),
        name: reg.name,
        email: reg.email,
        password_hash: hash_password(&reg.password)?,
        gender: reg.gender.as_str().to_string(),
        date_of_birth: reg.date_of_birth,
        age: reg.age,
        height_cm: reg.height_cm,
        current_weight_kg: reg.weight_kg,
        current_bmi,
        gym_timing: reg.gym_timing,
        image_url: None,
        created_at: now,
    };
    let seed = WeightLogEntry {
        id: Uuid::new_v4(),
        actor_id: user.id,
        weight_kg: user.current_weight_kg,
        bmi: current_bmi,
        recorded_at: now,
    };
    let Some(joined) = state.users.register(&user, &seed).await? else {
        return Err(AppError::Conflict("Email already registered".into()));
    };
    info!(user_id = %user.id, joined_groups = joined.len(), "user registered");

    let keys = JwtKeys::from(&state.config.jwt);
    Ok((StatusCode::CREATED, Json(issue_tokens(&keys, &user)?)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let email = normalize_email(&payload.email);
    let invalid = || AppError::Unauthorized("Invalid credentials".into());

    let Some(user) = state.users.find_by_email(&email).await? else {
        warn!(%email, "login for unknown email");
        return Err(invalid());
    };
    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "wrong password");
        return Err(invalid());
    }

    info!(user_id = %user.id, "user logged in");
    let keys = JwtKeys::from(&state.config.jwt);
    Ok(Json(issue_tokens(&keys, &user)?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let keys = JwtKeys::from(&state.config.jwt);
    let claims = keys.verify_refresh(&payload.refresh_token).map_err(|e| {
        warn!(error = %e, "refresh rejected");
        AppError::Unauthorized("Invalid refresh token".into())
    })?;
    let user = state
        .users
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid refresh token".into()))?;
    Ok(Json(issue_tokens(&keys, &user)?))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<AccountView>> {
    let user = load_user(&state, user_id).await?;
    Ok(Json(AccountView::from(&user)))
}

/// Applies the changes and recomputes BMI from the current weight.
#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<AccountView>> {
    let mut user = load_user(&state, user_id).await?;
    payload.apply(&mut user)?;
    user.current_bmi = bmi(user.current_weight_kg, user.height_cm)?;
    state.users.update_profile(&user).await?;
    info!("profile updated");
    Ok(Json(AccountView::from(&user)))
}

#[instrument(skip(state))]
pub async fn delete_account(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<MessageResponse>> {
    if !state.users.delete(user_id).await? {
        return Err(AppError::not_found("User not found"));
    }
    info!("account deleted");
    Ok(Json(MessageResponse::new("Account deleted successfully")))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PublicUser>> {
    let user = load_user(&state, id).await?;
    Ok(Json(PublicUser::from(&user)))
}
