//! Bibliotheca library lending server
//!
//! REST JSON API over a SQLite store for managing libraries, their users,
//! the book inventory, and the borrow/return lifecycle.

use std::sync::Arc;

use sqlx::{Pool, Sqlite};

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Wire repositories and services on top of an open pool
    pub fn new(config: AppConfig, pool: Pool<Sqlite>) -> AppResult<Self> {
        let repository = repository::Repository::new(pool);
        let services = services::Services::new(repository, &config)?;
        Ok(Self {
            config: Arc::new(config),
            services: Arc::new(services),
        })
    }
}
