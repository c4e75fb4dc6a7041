use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{
        BatchDeleteRequest, BatchDeleteResult, CreateProductInput, ProductListQuery,
        UpdateProductInput,
    },
    response::{respond, respond_empty, respond_paginated},
    services::products,
};
use actix_web::{delete, get, http::StatusCode, post, put, web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Lists the catalog. Public.
///
/// ## Query Parameters:
/// - `page`, `limit` (optional): Paging; invalid values fall back to page 1 and 10 rows.
/// - `search` (optional): Case-insensitive substring of the name or description.
/// - `sort` (optional): `oldest` for ascending creation time; newest first otherwise.
#[get("")]
pub async fn get_products(
    pool: web::Data<PgPool>,
    query: web::Query<ProductListQuery>,
) -> Result<HttpResponse, AppError> {
    let page = query.page_params();
    let (items, total) = products::list(&pool, &query, &page).await?;
    Ok(respond_paginated(
        items,
        total,
        &page,
        "Products retrieved successfully",
    ))
}

/// Lists a new product owned by the caller.
///
/// ## Request Body:
/// - `name`: 1 to 255 characters.
/// - `description` (optional).
/// - `price`: Positive, at most two decimals are kept.
/// - `stock` (optional): Non-negative, defaults to 0.
#[post("")]
pub async fn create_product(
    pool: web::Data<PgPool>,
    product_data: web::Json<CreateProductInput>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let product_data = product_data.into_inner().trimmed();
    product_data.validate()?;

    let product = products::create(&pool, user.id(), product_data).await?;
    Ok(respond(
        StatusCode::CREATED,
        product,
        "Product created successfully",
    ))
}

/// Deletes several of the caller's products at once. Foreign ids are skipped.
#[post("/delete/batch")]
pub async fn delete_products_batch(
    pool: web::Data<PgPool>,
    body: web::Json<BatchDeleteRequest>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let ids = body.into_inner().into_ids()?;
    let deleted_count = products::delete_batch(&pool, user.id(), &ids).await?;
    Ok(respond(
        StatusCode::OK,
        BatchDeleteResult { deleted_count },
        "Products deleted successfully",
    ))
}

/// Fetches one product. Public.
#[get("/{id}")]
pub async fn get_product(
    pool: web::Data<PgPool>,
    product_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product = products::get_by_id(&pool, product_id.into_inner()).await?;
    Ok(respond(StatusCode::OK, product, "Product retrieved successfully"))
}

/// Updates one of the caller's products. Omitted fields keep their current value.
///
/// ## Responses:
/// - `200 OK`: The updated product.
/// - `404 Not Found`: No such product, or it was listed by another user.
#[put("/{id}")]
pub async fn update_product(
    pool: web::Data<PgPool>,
    product_id: web::Path<Uuid>,
    product_data: web::Json<UpdateProductInput>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let product_data = product_data.into_inner().trimmed();
    product_data.validate()?;

    let product = products::update(&pool, user.id(), product_id.into_inner(), product_data)
        .await?;
    Ok(respond(StatusCode::OK, product, "Product updated successfully"))
}

#[delete("/{id}")]
pub async fn delete_product(
    pool: web::Data<PgPool>,
    product_id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    products::delete(&pool, user.id(), product_id.into_inner()).await?;
    Ok(respond_empty(StatusCode::OK, "Product deleted successfully"))
}
