use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Todo record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub duration: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone)]
pub struct NewTodo {
    pub title: String,
    pub description: String,
    pub duration: i32,
}

/// The only todo fields a request may set.
#[derive(Debug, Clone)]
pub struct TodoChanges {
    pub title: String,
    pub description: String,
    pub duration: i32,
}

impl Todo {
    pub fn with_changes(self, changes: TodoChanges, now: OffsetDateTime) -> Todo {
        Todo {
            title: changes.title,
            description: changes.description,
            duration: changes.duration,
            updated_at: Some(now),
            ..self
        }
    }
}
