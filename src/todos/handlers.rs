use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::dto::{TodoRequest, TodoResponse};
use super::services;
use crate::{
    auth::extractors::Caller, error::AppResult, extract::AppJson, state::AppState,
    users::dto::MessageResponse,
};

pub fn todo_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_all).post(create))
        .route("/:id", get(get_by_id).put(update).delete(delete_todo))
}

#[instrument(skip(state))]
pub async fn get_all(State(state): State<AppState>) -> AppResult<Json<Vec<TodoResponse>>> {
    Ok(Json(services::get_all(&state).await?))
}

// Todos carry no owner column: the record routes below gate on the path id
// matching the caller's own user id, or on the Admin role.

#[instrument(skip(state))]
pub async fn get_by_id(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> AppResult<Json<TodoResponse>> {
    caller.ensure_access(&id)?;
    Ok(Json(services::get_by_id(&state, &id).await?))
}

#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    AppJson(payload): AppJson<TodoRequest>,
) -> AppResult<Json<TodoResponse>> {
    payload.validate()?;
    Ok(Json(services::create(&state, payload).await?))
}

#[instrument(skip(state, payload))]
pub async fn update(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    AppJson(payload): AppJson<TodoRequest>,
) -> AppResult<Json<TodoResponse>> {
    caller.ensure_access(&id)?;
    payload.validate()?;
    Ok(Json(services::update(&state, &id, payload).await?))
}

#[instrument(skip(state))]
pub async fn delete_todo(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    caller.ensure_access(&id)?;
    services::delete(&state, &id).await?;
    Ok(Json(MessageResponse::new("Todo deleted successfully")))
}
