use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::trim_owned;
use crate::pagination::PageParams;

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Not started yet. New tasks start here.
    Pending,
    /// Currently being worked on.
    InProgress,
    Completed,
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

pub const TASK_COLUMNS: &str = "id, user_id, title, status, created_at, updated_at";

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    /// Identifier of the user who owns the task.
    pub user_id: Uuid,
    pub title: String,
    pub status: TaskStatus,
    /// Timestamp of when the task was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last update to the task.
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /tasks`.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateTaskInput {
    /// Must be between 1 and 255 characters.
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,
    /// Defaults to `PENDING` when omitted.
    pub status: Option<TaskStatus>,
}

impl CreateTaskInput {
    /// Trims the title so that validation sees what gets stored.
    pub fn trimmed(self) -> Self {
        Self {
            title: trim_owned(self.title),
            ..self
        }
    }
}

/// Body of `PUT /tasks/{id}`. Fields left out keep their stored value.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct UpdateTaskInput {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: Option<String>,
    pub status: Option<TaskStatus>,
}

impl UpdateTaskInput {
    pub fn trimmed(self) -> Self {
        Self {
            title: self.title.map(trim_owned),
            ..self
        }
    }
}

/// Query string of `GET /tasks`.
#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    /// Case-insensitive substring match on the title.
    pub search: Option<String>,
    pub status: Option<TaskStatus>,
    /// `oldest` sorts ascending by creation time; anything else sorts newest first.
    pub sort: Option<String>,
}

impl TaskListQuery {
    pub fn page_params(&self) -> PageParams {
        PageParams::sanitize(self.page.as_deref(), self.limit.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_input_validation() {
        let valid = CreateTaskInput {
            title: "Buy milk".to_string(),
            status: None,
        };
        assert!(valid.validate().is_ok());

        let empty = CreateTaskInput {
            title: "".to_string(),
            status: Some(TaskStatus::Completed),
        };
        assert!(empty.validate().is_err(), "Validation should fail for empty title.");

        let too_long = CreateTaskInput {
            title: "a".repeat(256),
            status: None,
        };
        assert!(
            too_long.validate().is_err(),
            "Validation should fail for overly long title."
        );
    }

    #[test]
    fn test_blank_title_is_rejected_after_trimming() {
        let blank = CreateTaskInput {
            title: "   ".to_string(),
            status: None,
        }
        .trimmed();
        assert_eq!(blank.title, "");
        assert!(blank.validate().is_err());

        let padded = CreateTaskInput {
            title: "  Buy milk ".to_string(),
            status: None,
        }
        .trimmed();
        assert_eq!(padded.title, "Buy milk");
        assert!(padded.validate().is_ok());

        let blank_update = UpdateTaskInput {
            title: Some("\t".to_string()),
            status: None,
        }
        .trimmed();
        assert!(blank_update.validate().is_err());
    }

    #[test]
    fn test_update_input_only_checks_present_fields() {
        assert!(UpdateTaskInput::default().validate().is_ok());

        let blank_title = UpdateTaskInput {
            title: Some(String::new()),
            status: None,
        };
        assert!(blank_title.validate().is_err());
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_value(TaskStatus::InProgress).unwrap(),
            serde_json::json!("IN_PROGRESS")
        );
        let parsed: UpdateTaskInput =
            serde_json::from_value(serde_json::json!({ "status": "COMPLETED" })).unwrap();
        assert_eq!(parsed.status, Some(TaskStatus::Completed));
        assert!(parsed.title.is_none());

        assert!(serde_json::from_value::<UpdateTaskInput>(serde_json::json!({ "status": "DONE" }))
            .is_err());
    }

    #[test]
    fn test_new_tasks_default_to_pending() {
        let input: CreateTaskInput =
            serde_json::from_value(serde_json::json!({ "title": "Buy milk" })).unwrap();
        assert_eq!(input.status.unwrap_or_default(), TaskStatus::Pending);
    }
}
