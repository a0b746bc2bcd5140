//! Gym rooms: shared scopes with an owner, members and pending invites.

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::state::AppState;

pub mod dto;
pub mod guard;
pub mod handlers;
pub mod invites;
pub mod overview;
pub mod repo;
pub mod service;

pub use invites::{InviteNotifier, LogNotifier};
pub use repo::{Group, GroupRepo};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/groups", post(handlers::create_group).get(handlers::list_groups))
        .route("/groups/:group_id", delete(handlers::delete_group))
        .route("/groups/:group_id/invite", post(handlers::invite))
        .route("/groups/:group_id/member/:member_id", delete(handlers::remove_member))
        .route("/groups/:group_id/body-part", post(handlers::create_body_part))
        .route("/groups/:group_id/body-parts", get(handlers::list_body_parts))
        .route("/groups/:group_id/exercise", post(handlers::create_exercise))
        .route("/groups/:group_id/set", post(handlers::log_set))
        .route(
            "/groups/:group_id/exercise/:exercise_id",
            delete(handlers::delete_exercise),
        )
        .route(
            "/groups/:group_id/exercise/:exercise_id/overview",
            get(handlers::exercise_overview),
        )
}
