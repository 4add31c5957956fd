use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{NewTodo, Todo};
use crate::error::StoreError;

/// Persistence for todo records.
#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Todo>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Todo>, StoreError>;
    async fn insert(&self, todo: NewTodo) -> Result<Todo, StoreError>;
    async fn save(&self, todo: &Todo) -> Result<Todo, StoreError>;
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[derive(Clone)]
pub struct PgTodoStore {
    db: PgPool,
}

impl PgTodoStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TodoStore for PgTodoStore {
    async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        let rows = sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, title, description, duration, created_at, updated_at
            FROM todos
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Todo>, StoreError> {
        let todo = sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, title, description, duration, created_at, updated_at
            FROM todos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(todo)
    }

    async fn insert(&self, todo: NewTodo) -> Result<Todo, StoreError> {
        let created = sqlx::query_as::<_, Todo>(
            r#"
            INSERT INTO todos (id, title, description, duration, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, duration, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.duration)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(&self.db)
        .await?;
        Ok(created)
    }

    async fn save(&self, todo: &Todo) -> Result<Todo, StoreError> {
        let saved = sqlx::query_as::<_, Todo>(
            r#"
            UPDATE todos
               SET title = $2, description = $3, duration = $4, updated_at = $5
             WHERE id = $1
            RETURNING id, title, description, duration, created_at, updated_at
            "#,
        )
        .bind(todo.id)
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.duration)
        .bind(todo.updated_at)
        .fetch_one(&self.db)
        .await?;
        Ok(saved)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
