//! Database layer for LitShelf
//!
//! Provides:
//! - SeaORM entity models
//! - Repository pattern for data access
//! - Connection pool management
//! - Schema bootstrap and project seeding

pub mod models;
mod repository;

pub use repository::{Mark, MarkUpdate, RankingStats, Repository};

use crate::config::DatabaseConfig;
use crate::errors::{AppError, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, Statement};
use std::time::Duration;
use tracing::info;

/// Projects seeded at startup (insert-if-absent, never updated afterwards)
const STOCK_PROJECTS: &[(&str, &str, &str, &str)] = &[
    (
        "trust-literature",
        "Trust Literature Survey",
        "Survey of trustworthiness evaluation literature",
        "from-blue-500 to-cyan-500",
    ),
    (
        "quant-papers",
        "Quantitative Finance Papers",
        "Academic papers and strategy research for quantitative trading",
        "from-purple-500 to-pink-500",
    ),
    (
        "ai-safety",
        "AI Safety Research",
        "AI safety, alignment, and ethics research",
        "from-red-500 to-orange-500",
    ),
];

/// Database connection pool wrapper
#[derive(Clone)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Create a new database pool from configuration
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        ensure_parent_dir(&config.url)?;

        info!("Connecting to database...");

        let mut opts = ConnectOptions::new(&config.url);
        opts.max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .sqlx_logging(true);

        let conn = Database::connect(opts)
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Failed to connect: {}", e),
            })?;

        info!("Database connection established");

        Ok(Self { conn })
    }

    /// Get the underlying connection
    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Ping the database to check connectivity
    pub async fn ping(&self) -> Result<()> {
        self.conn
            .execute_unprepared("SELECT 1")
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Ping failed: {}", e),
            })?;

        Ok(())
    }

    /// Create the schema if it does not exist yet
    pub async fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_unprepared(
                r#"
                CREATE TABLE IF NOT EXISTS papers (
                    id TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    authors TEXT,
                    year INTEGER,
                    venue TEXT,
                    abstract TEXT,
                    institution TEXT,
                    citations INTEGER DEFAULT 0,
                    ranking TEXT,
                    impact_factor REAL,
                    impact_factor_label TEXT,
                    publisher TEXT,
                    access_url TEXT,
                    doi TEXT,
                    bibtex TEXT,
                    key_contributions TEXT,
                    evaluation_method TEXT,
                    trust_dimensions TEXT,
                    star_rating INTEGER DEFAULT 0,
                    notes TEXT,
                    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
                )
                "#,
            )
            .await?;

        self.conn
            .execute_unprepared(
                r#"
                CREATE TABLE IF NOT EXISTS projects (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    description TEXT,
                    color TEXT,
                    paper_count INTEGER DEFAULT 0,
                    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
                )
                "#,
            )
            .await?;

        self.conn
            .execute_unprepared(
                r#"
                CREATE TABLE IF NOT EXISTS pdf_files (
                    id TEXT PRIMARY KEY,
                    paper_id TEXT,
                    filename TEXT,
                    file_path TEXT,
                    file_size INTEGER,
                    mime_type TEXT,
                    uploaded_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                    FOREIGN KEY (paper_id) REFERENCES papers(id)
                )
                "#,
            )
            .await?;

        Ok(())
    }

    /// Seed the stock projects, leaving existing rows untouched
    pub async fn seed_projects(&self) -> Result<()> {
        for (id, name, description, color) in STOCK_PROJECTS {
            let stmt = Statement::from_sql_and_values(
                DbBackend::Sqlite,
                r#"
                INSERT OR IGNORE INTO projects (id, name, description, color, paper_count)
                VALUES (?, ?, ?, ?, 0)
                "#,
                vec![
                    (*id).into(),
                    (*name).into(),
                    (*description).into(),
                    (*color).into(),
                ],
            );

            self.conn.execute(stmt).await?;
        }

        Ok(())
    }
}

/// Create the directory holding a file-backed SQLite database, if any
fn ensure_parent_dir(url: &str) -> Result<()> {
    if let Some(rest) = url.strip_prefix("sqlite://") {
        let path = rest.split('?').next().unwrap_or(rest);
        if !path.is_empty() && path != ":memory:" {
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;

    fn memory_config() -> DatabaseConfig {
        DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            ..DatabaseConfig::default()
        }
    }

    #[tokio::test]
    async fn test_schema_init_is_idempotent() {
        let pool = DbPool::new(&memory_config()).await.unwrap();
        pool.init_schema().await.unwrap();
        pool.init_schema().await.unwrap();
        pool.ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_seed_projects_twice_keeps_three_rows() {
        let pool = DbPool::new(&memory_config()).await.unwrap();
        pool.init_schema().await.unwrap();
        pool.seed_projects().await.unwrap();
        pool.seed_projects().await.unwrap();

        use sea_orm::{EntityTrait, PaginatorTrait};
        let count = models::ProjectEntity::find()
            .count(pool.conn())
            .await
            .unwrap();
        assert_eq!(count, 3);
    }
}
