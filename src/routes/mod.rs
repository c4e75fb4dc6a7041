pub mod auth;
pub mod files;
pub mod health;
pub mod products;
pub mod profile;
pub mod tasks;

use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse};

use crate::auth::AuthMiddleware;
use crate::response::respond_empty;
use crate::validation;

/// Registers every API route together with the extractor error handlers.
///
/// Static `/uploads` serving and the fallback handler are attached by the binary.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(validation::json_config())
        .app_data(validation::query_config())
        .app_data(validation::path_config())
        .service(health::health)
        .service(
            web::scope("/auth")
                .service(auth::register)
                .service(auth::login)
                .service(auth::refresh)
                .service(auth::logout),
        )
        .service(
            web::scope("/profile")
                .wrap(AuthMiddleware::required())
                .service(profile::get_profile)
                .service(profile::update_profile),
        )
        .service(
            web::scope("/users")
                .wrap(AuthMiddleware::required())
                .service(profile::get_users)
                .service(profile::update_current_user)
                .service(profile::get_user),
        )
        .service(
            web::scope("/tasks")
                .wrap(AuthMiddleware::required())
                .service(tasks::get_tasks)
                .service(tasks::create_task)
                .service(tasks::delete_tasks_batch)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        )
        .service(
            web::scope("/products")
                .wrap(AuthMiddleware::public_reads())
                .service(products::get_products)
                .service(products::create_product)
                .service(products::delete_products_batch)
                .service(products::get_product)
                .service(products::update_product)
                .service(products::delete_product),
        )
        .service(
            web::scope("/file")
                .wrap(AuthMiddleware::required())
                .service(files::upload_files)
                .service(files::delete_file),
        );
}

/// Fallback for paths no route matched.
pub async fn not_found(req: HttpRequest) -> HttpResponse {
    respond_empty(
        StatusCode::NOT_FOUND,
        &format!("Route {} not found", req.path()),
    )
}
