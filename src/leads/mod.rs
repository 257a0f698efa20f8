pub mod dto;
pub mod filter;
pub mod handlers;
pub mod import;
pub mod repo;
pub mod repo_types;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::read_routes()
}
