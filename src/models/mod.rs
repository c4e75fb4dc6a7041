pub mod product;
pub mod task;
pub mod user;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

pub use product::{CreateProductInput, Product, ProductListQuery, UpdateProductInput};
pub use task::{CreateTaskInput, Task, TaskListQuery, TaskStatus, UpdateTaskInput};
pub use user::{ProfilePatch, ProfileUpdate, PublicUser, UserListQuery};

/// Drops surrounding whitespace, keeping the allocation when there is none.
pub(crate) fn trim_owned(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_string()
    }
}

/// Body of the `/delete/batch` endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct BatchDeleteRequest {
    pub ids: Option<Vec<Uuid>>,
}

impl BatchDeleteRequest {
    /// The ids to delete. A missing or empty list is a 400.
    pub fn into_ids(self) -> Result<Vec<Uuid>, AppError> {
        match self.ids {
            Some(ids) if !ids.is_empty() => Ok(ids),
            _ => Err(AppError::ValidationError(
                "ids must be a non-empty array".into(),
            )),
        }
    }
}

/// Result of a batch delete.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BatchDeleteResult {
    pub deleted_count: u64,
}
