use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use super::dto::{TodoRequest, TodoResponse};
use super::repo_types::Todo;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

const TODO_NOT_FOUND: &str = "Todo not found";

async fn get_todo(state: &AppState, raw_id: &str) -> AppResult<Todo> {
    let id = Uuid::parse_str(raw_id).map_err(|_| AppError::NotFound(TODO_NOT_FOUND.into()))?;
    state
        .todos
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(TODO_NOT_FOUND.into()))
}

pub async fn get_all(state: &AppState) -> AppResult<Vec<TodoResponse>> {
    let todos = state.todos.list().await?;
    Ok(todos.iter().map(TodoResponse::from).collect())
}

pub async fn get_by_id(state: &AppState, raw_id: &str) -> AppResult<TodoResponse> {
    let todo = get_todo(state, raw_id).await?;
    Ok(TodoResponse::from(&todo))
}

pub async fn create(state: &AppState, req: TodoRequest) -> AppResult<TodoResponse> {
    let todo = state.todos.insert(req.into_new()).await?;
    info!(todo_id = %todo.id, "todo created");
    Ok(TodoResponse::from(&todo))
}

pub async fn update(state: &AppState, raw_id: &str, req: TodoRequest) -> AppResult<TodoResponse> {
    let todo = get_todo(state, raw_id).await?;
    let todo = todo.with_changes(req.into_changes(), OffsetDateTime::now_utc());
    let todo = state.todos.save(&todo).await?;
    info!(todo_id = %todo.id, "todo updated");
    Ok(TodoResponse::from(&todo))
}

pub async fn delete(state: &AppState, raw_id: &str) -> AppResult<()> {
    let todo = get_todo(state, raw_id).await?;
    if !state.todos.delete(todo.id).await? {
        return Err(AppError::NotFound(TODO_NOT_FOUND.into()));
    }
    info!(todo_id = %todo.id, "todo deleted");
    Ok(())
}
