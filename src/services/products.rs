//! Product catalog. Reads are public; writes are scoped by the listing user's id.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::product::PRODUCT_COLUMNS;
use crate::models::{CreateProductInput, Product, ProductListQuery, UpdateProductInput};
use crate::pagination::PageParams;
use crate::query::{ListQuery, SortOrder};

fn not_found() -> AppError {
    AppError::NotFound("Product not found".into())
}

pub async fn create(
    pool: &PgPool,
    owner: Uuid,
    input: CreateProductInput,
) -> Result<Product, AppError> {
    let product = sqlx::query_as::<_, Product>(&format!(
        "INSERT INTO products (user_id, name, description, price, stock)
         VALUES ($1, $2, $3, $4::NUMERIC, $5)
         RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(owner)
    .bind(input.name)
    .bind(input.description)
    .bind(input.price)
    .bind(input.stock)
    .fetch_one(pool)
    .await?;

    log::debug!("product {} listed by user {}", product.id, owner);
    Ok(product)
}

/// One page of the whole catalog plus the total count for the same filter.
pub async fn list(
    pool: &PgPool,
    params: &ProductListQuery,
    page: &PageParams,
) -> Result<(Vec<Product>, i64), AppError> {
    let query = ListQuery::new("products", PRODUCT_COLUMNS)
        .search(params.search.as_deref(), &["name", "description"])
        .sort(SortOrder::from_param(params.sort.as_deref()));

    let mut select = query.select_page(page);
    let mut count = query.count();
    let (products, total) = tokio::try_join!(
        select.build_query_as::<Product>().fetch_all(pool),
        count.build_query_scalar::<i64>().fetch_one(pool),
    )?;
    Ok((products, total))
}

pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Product, AppError> {
    sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(not_found)
}

/// Applies the fields present in `input`; absent fields keep their stored value.
pub async fn update(
    pool: &PgPool,
    owner: Uuid,
    id: Uuid,
    input: UpdateProductInput,
) -> Result<Product, AppError> {
    let product = sqlx::query_as::<_, Product>(&format!(
        "UPDATE products
         SET name = COALESCE($1, name),
             description = COALESCE($2, description),
             price = COALESCE($3::NUMERIC, price),
             stock = COALESCE($4, stock),
             updated_at = NOW()
         WHERE id = $5 AND user_id = $6
         RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(input.name)
    .bind(input.description)
    .bind(input.price)
    .bind(input.stock)
    .bind(id)
    .bind(owner)
    .fetch_optional(pool)
    .await?;

    product.ok_or_else(not_found)
}

pub async fn delete(pool: &PgPool, owner: Uuid, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(owner)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(not_found());
    }
    Ok(())
}

/// Deletes whichever of `ids` the owner listed. Other ids are skipped silently.
pub async fn delete_batch(pool: &PgPool, owner: Uuid, ids: &[Uuid]) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM products WHERE id = ANY($1) AND user_id = $2")
        .bind(ids)
        .bind(owner)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
