//! Body weight log with BMI and trend.

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub mod dto;
pub mod handlers;
pub mod repo;
pub mod trend;

pub use repo::{WeightLogEntry, WeightRepo};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/weight", post(handlers::add_weight))
        .route("/auth/weight-log", get(handlers::weight_log))
}
