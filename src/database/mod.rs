pub mod models;
pub mod queries;
pub mod schema;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::DatabaseConfig;

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;
        Ok(Database { pool })
    }

    /// Connect using the configured pool size, retrying while the database
    /// is unreachable.
    pub async fn connect(settings: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(&settings.url)?.create_if_missing(true);
        let attempts = settings.connect_retries.max(1);

        let mut attempt = 1;
        loop {
            match SqlitePoolOptions::new()
                .max_connections(settings.max_connections)
                .connect_with(options.clone())
                .await
            {
                Ok(pool) => return Ok(Database { pool }),
                Err(e) if attempt < attempts => {
                    warn!(attempt, error = %e, "database connect failed, retrying");
                    tokio::time::sleep(Duration::from_secs(settings.retry_delay_secs)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Single pinned connection: every SQLite `:memory:` connection is its
    /// own database, so the pool must never open a second one.
    pub async fn new_in_memory() -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let database = Database { pool };
        database.run_migrations().await?;
        Ok(database)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        for (name, sql) in schema::MIGRATIONS {
            sqlx::raw_sql(sql).execute(&self.pool).await?;
            info!("Applied migration {}", name);
        }
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
