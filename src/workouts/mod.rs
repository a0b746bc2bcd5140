//! Set ledger and personal workout routes.

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub mod dto;
pub mod handlers;
pub mod history;
pub mod ledger;
pub mod repo;

pub use repo::{SetLogEntry, SetLogRepo};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/exercise", post(handlers::create_exercise))
        .route("/exercise/body-part", post(handlers::create_body_part))
        .route("/exercise/body-parts", get(handlers::list_body_parts))
        .route("/exercise/body-part/:id/exercises", get(handlers::list_exercises))
        .route("/exercise/set", post(handlers::log_set))
        .route("/exercise/:id/history", get(handlers::history))
}
