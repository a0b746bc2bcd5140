//! Food log and daily calorie totals.

use axum::{
    routing::{get, put},
    Router,
};

use crate::state::AppState;

pub mod dto;
pub mod handlers;
pub mod repo;
pub mod service;
pub mod summary;

pub use repo::{MealType, NutritionEntry, NutritionRepo};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/nutrition", get(handlers::list).post(handlers::create))
        .route("/nutrition/summary/daily", get(handlers::daily_summary))
        .route("/nutrition/:id", put(handlers::update).delete(handlers::delete))
}
