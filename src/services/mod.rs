//! SQL and filesystem work behind the route handlers.

pub mod files;
pub mod products;
pub mod profile;
pub mod tasks;

pub use files::{FileStorage, IncomingFile, UploadPolicy};
