use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

mod claims;
pub mod credentials;
pub mod dto;
pub mod handlers;
pub mod jwt;
pub mod repo;

pub use jwt::AuthUser;
pub use repo::{User, UserRepo};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/auth/refresh", post(handlers::refresh))
        .route("/auth/me", get(handlers::get_me))
        .route(
            "/auth/profile",
            get(crate::profile::get_profile)
                .put(handlers::update_profile)
                .delete(handlers::delete_account),
        )
        .route("/users/:id", get(handlers::get_user))
}
