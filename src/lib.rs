//! Menoo server library
//!
//! Restaurant onboarding, menu editing and publishing, billing webhooks and
//! menu view analytics over a Postgres database.

pub mod auth;
pub mod billing;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod menus;
pub mod models;
pub mod restaurants;
pub mod routes;
pub mod security;

pub use config::Config;
pub use db::{create_pool, Database};
pub use error::{AppError, Result};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// `None` when no database URL is configured
    pub db: Option<Database>,
    pub config: Config,
}

impl AppState {
    pub fn new(db: Option<Database>, config: Config) -> Self {
        Self { db, config }
    }

    /// Database handle, or 503 when the client was never initialised
    pub fn db(&self) -> Result<&Database> {
        self.db.as_ref().ok_or(AppError::Unavailable)
    }
}
