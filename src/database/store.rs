//! Storage seams. Services only see these traits; [`PgStore`] and
//! [`MemoryStore`] provide them.
//!
//! [`PgStore`]: super::postgres::PgStore
//! [`MemoryStore`]: super::memory::MemoryStore

use async_trait::async_trait;
use thiserror::Error;

use super::partition::Partition;
use crate::config::ConfigError;
use crate::models::{RecordId, Resource, Stored, UserRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid partition name: {0}")]
    InvalidPartition(String),

    /// A natural-key unique index rejected the write.
    #[error("Unique constraint violated")]
    UniqueViolation,

    #[error("Store unavailable")]
    Unavailable,

    #[error("Malformed stored row: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Per-partition CRUD for one resource type.
#[async_trait]
pub trait RecordStore<R: Resource>: Send + Sync {
    /// Matching records in the resource's list order.
    async fn list(&self, partition: &Partition, filter: &R::Filter) -> Result<Vec<Stored<R>>, StoreError>;

    /// Whether another record already holds `record`'s natural key.
    async fn find_conflict(
        &self,
        partition: &Partition,
        record: &R,
        exclude: Option<&RecordId>,
    ) -> Result<bool, StoreError>;

    async fn insert(&self, partition: &Partition, record: R) -> Result<Stored<R>, StoreError>;

    /// `false` when no record has `id`.
    async fn update(&self, partition: &Partition, id: &RecordId, record: R) -> Result<bool, StoreError>;

    /// `false` when no record has `id`.
    async fn delete(&self, partition: &Partition, id: &RecordId) -> Result<bool, StoreError>;
}

/// The global partition: user identities and password hashes.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn insert_user(&self, user: UserRecord) -> Result<(), StoreError>;

    async fn list_users(&self) -> Result<Vec<UserRecord>, StoreError>;

    /// Liveness check for `/health`.
    async fn ping(&self) -> Result<(), StoreError>;
}
