use actix_cors::Cors;
use actix_files::Files;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::io;

use taskmart::auth::JwtKeys;
use taskmart::config::Config;
use taskmart::routes;
use taskmart::services::FileStorage;

fn cors(config: &Config) -> Cors {
    let cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(3600);
    match &config.cors_allowed_origin {
        Some(origin) => cors.allowed_origin(origin),
        None => cors.allow_any_origin(),
    }
}

fn startup_error(context: &str, err: impl std::fmt::Display) -> io::Error {
    log::error!("{}: {}", context, err);
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| startup_error("invalid configuration", e))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .map_err(|e| startup_error("failed to connect to database", e))?;

    if config.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| startup_error("failed to run migrations", e))?;
        log::info!("database migrations applied");
    }

    let storage = FileStorage::from_config(&config);
    tokio::fs::create_dir_all(storage.root())
        .await
        .map_err(|e| startup_error("failed to create upload directory", e))?;

    let keys = web::Data::new(JwtKeys::from_config(&config));
    let pool = web::Data::new(pool);
    let storage = web::Data::new(storage);
    let bind_addr = (config.server_host.clone(), config.server_port);

    log::info!(
        "Starting taskmart server at {} ({:?})",
        config.server_url(),
        config.environment
    );
    let config = web::Data::new(config);

    HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .app_data(keys.clone())
            .app_data(config.clone())
            .app_data(storage.clone())
            .wrap(cors(&config))
            .wrap(Logger::default())
            .configure(routes::config)
            .service(Files::new("/uploads", storage.root()))
            .default_service(web::to(routes::not_found))
    })
    .bind(bind_addr)?
    .run()
    .await
}
