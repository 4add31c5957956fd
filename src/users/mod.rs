use crate::state::AppState;
use axum::Router;

pub mod dto;
mod emails;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}
