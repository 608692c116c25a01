//! recipebox
//!
//! HTTP API for managing recipes, ingredients and tags. Every record belongs
//! to one user and is only visible to that user.

pub mod config;
pub mod db;
pub mod models;
pub mod server;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
