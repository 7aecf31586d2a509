use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::partition::Partition;
use super::store::{CredentialStore, RecordStore, StoreError};
use crate::models::{RecordId, Resource, Stored, UserRecord};

type CollectionKey = (String, &'static str);

/// In-process store mirroring the Postgres one: partitions are isolated and
/// natural keys are unique. Listings sort text bytewise, which matches the
/// `COLLATE "C"` ordering the Postgres queries use.
///
/// Used by the test suite and for running the API without a database.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<CollectionKey, Box<dyn Any + Send + Sync>>>,
    users: RwLock<Vec<UserRecord>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every operation fails with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable)
        } else {
            Ok(())
        }
    }

    fn key<R: Resource>(partition: &Partition) -> CollectionKey {
        (partition.name().to_string(), R::COLLECTION)
    }
}

fn downcast<R: Resource>(entry: &mut Box<dyn Any + Send + Sync>) -> Result<&mut Vec<Stored<R>>, StoreError> {
    entry
        .downcast_mut::<Vec<Stored<R>>>()
        .ok_or_else(|| StoreError::Corrupt(format!("collection {} holds another type", R::COLLECTION)))
}

#[async_trait]
impl<R: Resource> RecordStore<R> for MemoryStore {
    async fn list(&self, partition: &Partition, filter: &R::Filter) -> Result<Vec<Stored<R>>, StoreError> {
        self.check_available()?;
        let collections = self.collections.read().await;
        let Some(entry) = collections.get(&Self::key::<R>(partition)) else {
            return Ok(Vec::new());
        };
        let records = entry
            .downcast_ref::<Vec<Stored<R>>>()
            .ok_or_else(|| StoreError::Corrupt(format!("collection {} holds another type", R::COLLECTION)))?;

        let mut matching: Vec<Stored<R>> = records
            .iter()
            .filter(|stored| stored.record.matches(filter))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.record.list_order(&b.record));
        Ok(matching)
    }

    async fn find_conflict(
        &self,
        partition: &Partition,
        record: &R,
        exclude: Option<&RecordId>,
    ) -> Result<bool, StoreError> {
        let filter = R::Filter::default();
        let existing = <Self as RecordStore<R>>::list(self, partition, &filter).await?;
        Ok(existing
            .iter()
            .any(|stored| Some(&stored.id) != exclude && stored.record.same_natural_key(record)))
    }

    async fn insert(&self, partition: &Partition, record: R) -> Result<Stored<R>, StoreError> {
        self.check_available()?;
        let mut collections = self.collections.write().await;
        let entry = collections
            .entry(Self::key::<R>(partition))
            .or_insert_with(|| Box::new(Vec::<Stored<R>>::new()) as Box<dyn Any + Send + Sync>);
        let records = downcast::<R>(entry)?;

        if records.iter().any(|stored| stored.record.same_natural_key(&record)) {
            return Err(StoreError::UniqueViolation);
        }
        let stored = Stored::new(RecordId::generate(), record);
        records.push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, partition: &Partition, id: &RecordId, record: R) -> Result<bool, StoreError> {
        self.check_available()?;
        let mut collections = self.collections.write().await;
        let Some(entry) = collections.get_mut(&Self::key::<R>(partition)) else {
            return Ok(false);
        };
        let records = downcast::<R>(entry)?;

        if records
            .iter()
            .any(|stored| &stored.id != id && stored.record.same_natural_key(&record))
        {
            return Err(StoreError::UniqueViolation);
        }
        match records.iter_mut().find(|stored| &stored.id == id) {
            Some(stored) => {
                stored.record = record;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, partition: &Partition, id: &RecordId) -> Result<bool, StoreError> {
        self.check_available()?;
        let mut collections = self.collections.write().await;
        let Some(entry) = collections.get_mut(&Self::key::<R>(partition)) else {
            return Ok(false);
        };
        let records = downcast::<R>(entry)?;

        let before = records.len();
        records.retain(|stored| &stored.id != id);
        Ok(records.len() < before)
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        self.check_available()?;
        let users = self.users.read().await;
        Ok(users.iter().find(|user| user.email == email).cloned())
    }

    async fn insert_user(&self, user: UserRecord) -> Result<(), StoreError> {
        self.check_available()?;
        let mut users = self.users.write().await;
        if users.iter().any(|existing| existing.email == user.email || existing.id == user.id) {
            return Err(StoreError::UniqueViolation);
        }
        users.push(user);
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, StoreError> {
        self.check_available()?;
        let mut users = self.users.read().await.clone();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available()
    }
}
