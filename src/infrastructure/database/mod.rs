pub mod entities;
pub mod listing;
pub mod migrator;
pub mod repositories;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde::Deserialize;
use tracing::info;

/// Connection pool settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    /// Log every SQL statement through sqlx
    pub sqlx_logging: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 8,
            sqlx_logging: false,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite://./ratebook.db?mode=rwc")
    pub url: String,
    pub pool: PoolConfig,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./ratebook.db?mode=rwc".to_string(),
            pool: PoolConfig::default(),
        }
    }
}

impl DatabaseConfig {
    /// Single-connection in-memory database; every pooled connection to
    /// `sqlite::memory:` would otherwise see its own empty schema.
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            pool: PoolConfig {
                max_connections: 1,
                min_connections: 1,
                ..Default::default()
            },
        }
    }
}

/// Initialize database connection
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, sea_orm::DbErr> {
    info!("Connecting to database: {}", config.url);
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.pool.max_connections)
        .min_connections(config.pool.min_connections)
        .connect_timeout(Duration::from_secs(config.pool.connect_timeout_secs))
        .sqlx_logging(config.pool.sqlx_logging);
    let db = Database::connect(options).await?;
    info!("Database connected successfully");
    Ok(db)
}

/// Fresh migrated in-memory database for tests
#[cfg(test)]
pub(crate) async fn setup_db() -> DatabaseConnection {
    use sea_orm_migration::MigratorTrait;

    let db = init_database(&DatabaseConfig::in_memory())
        .await
        .expect("in-memory sqlite");
    migrator::Migrator::up(&db, None)
        .await
        .expect("migrations apply");
    db
}
