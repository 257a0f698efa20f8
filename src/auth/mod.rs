use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod email;
pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod repo;
pub mod repo_types;

/// Why a new account could not be stored.
#[derive(Debug, thiserror::Error)]
pub enum CreateUserError {
    #[error("Email already registered")]
    EmailTaken,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::auth_routes())
        .merge(handlers::me_routes())
}
