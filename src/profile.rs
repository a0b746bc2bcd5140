//! The profile page: account fields plus calorie and weight rollups.

use axum::extract::State;
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::{dto::AccountView, AuthUser, UserRepo},
    error::{AppError, AppResult},
    extract::Json,
    nutrition::{
        summary::{profile_calorie_summary, DailyCalories},
        NutritionRepo,
    },
    state::AppState,
    weight::{
        trend::{weight_history, Trend},
        WeightLogEntry, WeightRepo,
    },
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    #[serde(flatten)]
    pub account: AccountView,
    pub average_daily_calories: f64,
    pub daily_calorie_intake: Vec<DailyCalories>,
    pub weight_trend: Option<Trend>,
    pub weight_chart: Vec<WeightLogEntry>,
}

pub async fn build_profile(
    users: &dyn UserRepo,
    nutrition: &dyn NutritionRepo,
    weights: &dyn WeightRepo,
    actor_id: Uuid,
) -> AppResult<ProfileView> {
    let user = users
        .find_by_id(actor_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    let calories = profile_calorie_summary(nutrition, actor_id).await?;
    let weight = weight_history(weights, actor_id).await?;

    Ok(ProfileView {
        account: AccountView::from(&user),
        average_daily_calories: calories.average_daily_calories,
        daily_calorie_intake: calories.daily_calorie_intake,
        weight_trend: weight.trend,
        weight_chart: weight.logs,
    })
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<ProfileView>> {
    let profile = build_profile(&*state.users, &*state.nutrition, &*state.weights, user_id).await?;
    Ok(Json(profile))
}
