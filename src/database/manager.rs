use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    /// A unique index rejected the write. Carries the logical field name.
    #[error("Unique constraint violated on {0}")]
    UniqueViolation(String),

    /// A numeric value no longer fits its column. Carries the field name.
    #[error("Value out of range for {0}")]
    OutOfRange(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                let field = db.constraint().map(constraint_field).unwrap_or("record");
                DatabaseError::UniqueViolation(field.to_string())
            }
            // numeric_value_out_of_range
            sqlx::Error::Database(db) if db.code().as_deref() == Some("22003") => {
                DatabaseError::OutOfRange("value".to_string())
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DatabaseError::ConnectionError(err.to_string())
            }
            other => DatabaseError::Sqlx(other),
        }
    }
}

/// Maps the index names in `schema.sql` to the field they protect
fn constraint_field(constraint: &str) -> &'static str {
    match constraint {
        "users_email_key" => "email",
        "users_mobile_key" => "mobile",
        "cart_items_user_product_key" => "cart item",
        "wishlist_items_user_product_key" => "wishlist item",
        _ => "record",
    }
}

const SCHEMA: &str = include_str!("schema.sql");

/// Owns the connection pool for the configured database
#[derive(Debug, Clone)]
pub struct DatabaseManager {
    pool: PgPool,
}

impl DatabaseManager {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let target = Self::redacted(url)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        info!("Connected to database at {}", target);
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates tables and indexes that do not exist yet
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        for statement in Self::schema_statements() {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Database schema is up to date");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }

    fn schema_statements() -> impl Iterator<Item = &'static str> {
        SCHEMA
            .split(';')
            .map(str::trim)
            .filter(|statement| !statement.is_empty())
    }

    /// Host/port/database of a connection string, without credentials, for logs
    fn redacted(url: &str) -> Result<String, DatabaseError> {
        let url = url::Url::parse(url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        let host = url.host_str().ok_or(DatabaseError::InvalidDatabaseUrl)?;

        Ok(match url.port() {
            Some(port) => format!("{}:{}{}", host, port, url.path()),
            None => format!("{}{}", host, url.path()),
        })
    }
}
