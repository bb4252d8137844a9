//! # DevCamper DB
//!
//! Connection pool setup, embedded migrations and the SQL side of the
//! generic collection listing.

pub mod listing;

use std::env;

use sqlx::postgres::PgPoolOptions;

pub use listing::{fetch_document, fetch_listing};
pub use sqlx::PgPool;

/// Error raised while bringing the database up at startup.
#[derive(Debug)]
pub enum DbInitError {
    MissingUrl,
    Connect(sqlx::Error),
    Migrate(sqlx::migrate::MigrateError),
}

impl std::fmt::Display for DbInitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingUrl => write!(f, "DATABASE_URL must be set"),
            Self::Connect(e) => write!(f, "Failed to connect to database: {}", e),
            Self::Migrate(e) => write!(f, "Failed to run migrations: {}", e),
        }
    }
}

impl std::error::Error for DbInitError {}

/// Connects to the database named by `DATABASE_URL`.
///
/// The returned pool is cheaply cloneable and should be shared through the
/// application state.
pub async fn init_db_pool() -> Result<PgPool, DbInitError> {
    let database_url = env::var("DATABASE_URL").map_err(|_| DbInitError::MissingUrl)?;

    PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .map_err(DbInitError::Connect)
}

/// Applies the migrations in the workspace `migrations/` directory.
pub async fn run_migrations(db: &PgPool) -> Result<(), DbInitError> {
    sqlx::migrate!("../../migrations")
        .run(db)
        .await
        .map_err(DbInitError::Migrate)
}
