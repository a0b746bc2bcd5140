use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use crate::config::AppConfig;

/// Postgres-backed implementation of every repository trait.
#[derive(Clone)]
pub struct PgStore {
    pub(crate) pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects with the configured pool size and applies pending migrations.
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let url = config
            .database_url
            .as_deref()
            .context("DATABASE_URL is not set")?;
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(url)
            .await
            .context("connect to database")?;
        info!(max_connections = config.db_max_connections, "database pool ready");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("run migrations")?;
        info!("migrations applied");
        Ok(Self::new(pool))
    }
}
