#![doc = "The `taskmart` library crate."]
#![doc = ""]
#![doc = "Domain models, authentication, services, routing configuration and error handling"]
#![doc = "for the taskmart REST backend: per-user tasks, a public product catalog, user"]
#![doc = "profiles and file uploads. The binary (`main.rs`) wires these into an HTTP server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod pagination;
pub mod query;
pub mod response;
pub mod routes;
pub mod services;
pub mod validation;

pub use crate::config::Config;
pub use crate::error::AppError;
