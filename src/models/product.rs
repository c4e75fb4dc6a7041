use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::trim_owned;
use crate::pagination::PageParams;

/// Smallest positive amount a `NUMERIC(10, 2)` column holds.
pub const MIN_PRICE: f64 = 0.01;
/// Largest value a `NUMERIC(10, 2)` column holds.
pub const MAX_PRICE: f64 = 99_999_999.99;

/// Price is stored as `NUMERIC(10, 2)` and read back as a float.
pub const PRODUCT_COLUMNS: &str =
    "id, user_id, name, description, price::FLOAT8 AS price, stock, created_at, updated_at";

/// A catalog entry. Anybody may read it; only its owner may change it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    /// The user who listed the product.
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /products`.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateProductInput {
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: String,
    #[validate(length(max = 2000, message = "Description is too long"))]
    pub description: Option<String>,
    #[validate(range(min = "MIN_PRICE", max = "MAX_PRICE", message = "Price must be a positive number"))]
    pub price: f64,
    /// Defaults to 0.
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    #[serde(default)]
    pub stock: i32,
}

impl CreateProductInput {
    /// Trims name and description so that validation sees what gets stored.
    pub fn trimmed(self) -> Self {
        Self {
            name: trim_owned(self.name),
            description: self.description.map(trim_owned),
            ..self
        }
    }
}

/// Body of `PUT /products/{id}`. Fields left out keep their stored value.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProductInput {
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 2000, message = "Description is too long"))]
    pub description: Option<String>,
    #[validate(range(min = "MIN_PRICE", max = "MAX_PRICE", message = "Price must be a positive number"))]
    pub price: Option<f64>,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: Option<i32>,
}

impl UpdateProductInput {
    pub fn trimmed(self) -> Self {
        Self {
            name: self.name.map(trim_owned),
            description: self.description.map(trim_owned),
            ..self
        }
    }
}

/// Query string of `GET /products`.
#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    /// Case-insensitive substring match on name or description.
    pub search: Option<String>,
    pub sort: Option<String>,
}

impl ProductListQuery {
    pub fn page_params(&self) -> PageParams {
        PageParams::sanitize(self.page.as_deref(), self.limit.as_deref())
    }
}
