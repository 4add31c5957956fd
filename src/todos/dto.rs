use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{NewTodo, Todo, TodoChanges};
use crate::error::{AppError, AppResult};
use crate::validation;

#[derive(Debug, Clone, Serialize)]
pub struct TodoResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub duration: i32,
    #[serde(rename = "dateCreated", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(rename = "dateUpdated", with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl From<&Todo> for TodoResponse {
    fn from(t: &Todo) -> Self {
        Self {
            id: t.id,
            title: t.title.clone(),
            description: t.description.clone(),
            duration: t.duration,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

/// Body of both create and update; every field is required.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TodoRequest {
    pub title: String,
    pub description: String,
    pub duration: Option<i32>,
}

impl TodoRequest {
    pub fn validate(&self) -> AppResult<()> {
        validation::required("title", &self.title)?;
        validation::required("description", &self.description)?;
        match self.duration {
            None => Err(AppError::validation("duration", "\"duration\" is required")),
            Some(d) if d < 0 => Err(AppError::validation(
                "duration",
                "\"duration\" must be greater than or equal to 0",
            )),
            Some(_) => Ok(()),
        }
    }

    pub fn into_new(self) -> NewTodo {
        NewTodo {
            title: self.title,
            description: self.description,
            duration: self.duration.unwrap_or_default(),
        }
    }

    pub fn into_changes(self) -> TodoChanges {
        TodoChanges {
            title: self.title,
            description: self.description,
            duration: self.duration.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_is_required() {
        let req: TodoRequest =
            serde_json::from_str(r#"{"title":"t","description":"d"}"#).unwrap();
        match req.validate().unwrap_err() {
            AppError::Validation { field, .. } => assert_eq!(field, "duration"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn negative_duration_rejected() {
        let req = TodoRequest {
            title: "t".into(),
            description: "d".into(),
            duration: Some(-5),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn response_uses_date_field_names() {
        let todo = Todo {
            id: Uuid::new_v4(),
            title: "Write report".into(),
            description: "Quarterly".into(),
            duration: 90,
            created_at: OffsetDateTime::now_utc(),
            updated_at: None,
        };
        let json = serde_json::to_value(TodoResponse::from(&todo)).unwrap();
        assert_eq!(json["duration"], 90);
        assert!(json.get("dateCreated").is_some());
        assert!(json["dateUpdated"].is_null());
    }
}
