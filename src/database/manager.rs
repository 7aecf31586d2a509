use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use tokio::sync::{OnceCell, RwLock};
use tracing::{debug, info};

use super::partition::Partition;
use super::store::StoreError;
use super::tables;
use crate::config::{AppConfig, ConfigError};

/// Connection pool and partition bookkeeping for the Postgres backend.
///
/// One pool serves the global partition (`public.users`) and every user
/// partition, each of which is a schema named after the user. The pool is
/// created on first use; partitions are provisioned the first time they are
/// resolved and remembered afterwards.
pub struct DatabaseManager {
    config: Arc<AppConfig>,
    pool: OnceCell<PgPool>,
    provisioned: RwLock<HashSet<String>>,
}

impl DatabaseManager {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            pool: OnceCell::new(),
            provisioned: RwLock::new(HashSet::new()),
        }
    }

    /// Pool for the configured database, with the global schema in place.
    pub async fn global_pool(&self) -> Result<PgPool, StoreError> {
        let pool = self.pool.get_or_try_init(|| self.connect()).await?;
        Ok(pool.clone())
    }

    async fn connect(&self) -> Result<PgPool, StoreError> {
        let base = self.config.database_url()?;
        let database_name = self.config.database_name()?;
        let connection_string = Self::build_connection_string(base, database_name)?;

        let pool = PgPoolOptions::new()
            .max_connections(self.config.database.max_connections)
            .acquire_timeout(Duration::from_secs(self.config.database.connection_timeout))
            .connect(&connection_string)
            .await?;

        for statement in tables::global_statements() {
            sqlx::query(&statement).execute(&pool).await?;
        }

        info!("Created database pool for: {}", database_name);
        Ok(pool)
    }

    /// Pool for a user partition, provisioning its schema on first use.
    pub async fn partition_pool(&self, partition: &Partition) -> Result<PgPool, StoreError> {
        let pool = self.global_pool().await?;

        // Fast path: already provisioned
        {
            let provisioned = self.provisioned.read().await;
            if provisioned.contains(partition.name()) {
                return Ok(pool);
            }
        }

        let mut provisioned = self.provisioned.write().await;
        if !provisioned.contains(partition.name()) {
            Self::provision(&pool, partition).await?;
            provisioned.insert(partition.name().to_string());
        }
        Ok(pool)
    }

    async fn provision(pool: &PgPool, partition: &Partition) -> Result<(), StoreError> {
        if !Partition::is_valid_name(partition.name()) {
            return Err(StoreError::InvalidPartition(partition.name().to_string()));
        }
        for statement in tables::partition_statements(partition.name()) {
            sqlx::query(&statement).execute(pool).await?;
        }
        debug!("Provisioned partition: {}", partition);
        Ok(())
    }

    /// Swaps the database name into the path of `DATABASE_URL`, keeping
    /// credentials and query parameters.
    fn build_connection_string(base: &str, database_name: &str) -> Result<String, ConfigError> {
        let mut url = url::Url::parse(base).map_err(|_| ConfigError::InvalidDatabaseUrl)?;
        url.set_path(&format!("/{}", database_name));
        Ok(url.into())
    }

    pub async fn health_check(&self) -> Result<(), StoreError> {
        let pool = self.global_pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        if let Some(pool) = self.pool.get() {
            pool.close().await;
            info!("Closed database pool");
        }
    }
}
