use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::database::{Partition, RecordStore, StoreError};
use crate::models::{capitalized, RecordId, Resource, Stored};
use crate::validation::ValidationErrors;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation failed")]
    Validation(#[from] ValidationErrors),

    #[error("{0}")]
    InvalidId(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Duplicate(&'static str),

    /// `message` is safe to show to clients; `source` is for the logs.
    #[error("{message}")]
    Store {
        message: String,
        #[source]
        source: StoreError,
    },
}

/// List/create/update/delete for one resource type inside a partition.
///
/// Writes validate first, then check the id, then the natural key, and only
/// then touch the record. A unique-index violation from the store is
/// reported the same way as a failed pre-check, which covers two requests
/// racing past the pre-check together.
pub struct ResourceService<R: Resource> {
    store: Arc<dyn RecordStore<R>>,
}

impl<R: Resource> Clone for ResourceService<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<R: Resource> ResourceService<R> {
    pub fn new(store: Arc<dyn RecordStore<R>>) -> Self {
        Self { store }
    }

    pub async fn list(&self, partition: &Partition, filter: &R::Filter) -> Result<Vec<Stored<R>>, ServiceError> {
        self.store
            .list(partition, filter)
            .await
            .map_err(|source| store_failure(format!("Failed to fetch {}", R::PLURAL), source))
    }

    pub async fn create(&self, partition: &Partition, payload: &Value) -> Result<Stored<R>, ServiceError> {
        let record = R::validate(payload)?;
        let failure = || format!("Failed to create {}", R::SINGULAR);

        let taken = self
            .store
            .find_conflict(partition, &record, None)
            .await
            .map_err(|source| store_failure(failure(), source))?;
        if taken {
            return Err(ServiceError::Duplicate(R::DUPLICATE_MESSAGE));
        }

        match self.store.insert(partition, record).await {
            Ok(stored) => Ok(stored),
            Err(StoreError::UniqueViolation) => Err(ServiceError::Duplicate(R::DUPLICATE_MESSAGE)),
            Err(source) => Err(store_failure(failure(), source)),
        }
    }

    pub async fn update(&self, partition: &Partition, id: &str, payload: &Value) -> Result<Stored<R>, ServiceError> {
        let record = R::validate(payload)?;
        let id = parse_id::<R>(id)?;
        let failure = || format!("Failed to update {}", R::SINGULAR);

        let taken = self
            .store
            .find_conflict(partition, &record, Some(&id))
            .await
            .map_err(|source| store_failure(failure(), source))?;
        if taken {
            return Err(ServiceError::Duplicate(R::DUPLICATE_MESSAGE));
        }

        match self.store.update(partition, &id, record.clone()).await {
            Ok(true) => Ok(Stored::new(id, record)),
            Ok(false) => Err(not_found::<R>()),
            Err(StoreError::UniqueViolation) => Err(ServiceError::Duplicate(R::DUPLICATE_MESSAGE)),
            Err(source) => Err(store_failure(failure(), source)),
        }
    }

    pub async fn delete(&self, partition: &Partition, id: &str) -> Result<(), ServiceError> {
        let id = parse_id::<R>(id)?;
        match self.store.delete(partition, &id).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(not_found::<R>()),
            Err(source) => Err(store_failure(format!("Failed to delete {}", R::SINGULAR), source)),
        }
    }
}

fn parse_id<R: Resource>(raw: &str) -> Result<RecordId, ServiceError> {
    RecordId::parse(raw).map_err(|_| ServiceError::InvalidId(format!("Invalid {} ID format", R::SINGULAR)))
}

fn not_found<R: Resource>() -> ServiceError {
    ServiceError::NotFound(format!("{} not found", capitalized(R::SINGULAR)))
}

fn store_failure(message: String, source: StoreError) -> ServiceError {
    ServiceError::Store { message, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::models::{AuthenticatedUser, Company, Deposit, PortfolioEntry};
    use async_trait::async_trait;
    use serde_json::json;

    /// Loses every race: the pre-check sees no conflict but the unique
    /// index rejects the write.
    struct RacedStore;

    #[async_trait]
    impl RecordStore<Company> for RacedStore {
        async fn list(&self, _: &Partition, _: &()) -> Result<Vec<Stored<Company>>, StoreError> {
            Ok(Vec::new())
        }

        async fn find_conflict(&self, _: &Partition, _: &Company, _: Option<&RecordId>) -> Result<bool, StoreError> {
            Ok(false)
        }

        async fn insert(&self, _: &Partition, _: Company) -> Result<Stored<Company>, StoreError> {
            Err(StoreError::UniqueViolation)
        }

        async fn update(&self, _: &Partition, _: &RecordId, _: Company) -> Result<bool, StoreError> {
            Err(StoreError::UniqueViolation)
        }

        async fn delete(&self, _: &Partition, _: &RecordId) -> Result<bool, StoreError> {
            Ok(false)
        }
    }

    fn partition(n: u8) -> Partition {
        Partition::for_user(&AuthenticatedUser {
            id: format!("65f1c0ffee0000000000000{n}"),
            email: format!("u{n}@example.com"),
            name: "U".into(),
        })
        .unwrap()
    }

    fn companies(store: &Arc<MemoryStore>) -> ResourceService<Company> {
        ResourceService::new(store.clone())
    }

    fn digi() -> Value {
        json!({ "instrument": "DIGI", "isin": "RO123456789A", "issuer": "Digi Communications" })
    }

    #[tokio::test]
    async fn create_then_list_returns_normalized_record() {
        let store = Arc::new(MemoryStore::new());
        let service = companies(&store);
        let p = partition(1);

        let created = service
            .create(&p, &json!({ "instrument": " DIGI ", "isin": "RO123456789A", "issuer": "Digi" }))
            .await
            .unwrap();
        let listed = service.list(&p, &()).await.unwrap();

        assert_eq!(listed, vec![created.clone()]);
        assert_eq!(created.record.instrument, "DIGI");
    }

    #[tokio::test]
    async fn duplicate_instrument_conflicts_only_within_partition() {
        let store = Arc::new(MemoryStore::new());
        let service = companies(&store);

        service.create(&partition(1), &digi()).await.unwrap();
        let err = service.create(&partition(1), &digi()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Duplicate("Company with this instrument already exists")));

        assert!(service.create(&partition(2), &digi()).await.is_ok());
    }

    #[tokio::test]
    async fn unique_index_rejection_is_a_duplicate_on_create_and_update() {
        let service: ResourceService<Company> = ResourceService::new(Arc::new(RacedStore));
        let p = partition(1);

        let err = service.create(&p, &digi()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Duplicate(msg) if msg == Company::DUPLICATE_MESSAGE));

        let id = RecordId::generate();
        let err = service.update(&p, id.as_str(), &digi()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Duplicate(msg) if msg == Company::DUPLICATE_MESSAGE));
    }

    #[tokio::test]
    async fn update_validates_before_checking_id() {
        let store = Arc::new(MemoryStore::new());
        let service = companies(&store);

        let err = service.update(&partition(1), "nope", &json!({})).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let err = service.update(&partition(1), "nope", &digi()).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid company ID format");
    }

    #[tokio::test]
    async fn update_excludes_the_record_itself_from_conflicts() {
        let store = Arc::new(MemoryStore::new());
        let service = companies(&store);
        let p = partition(1);

        let digi_rec = service.create(&p, &digi()).await.unwrap();
        service
            .create(&p, &json!({ "instrument": "TLV", "isin": "ROTLVAACNOR1", "issuer": "BT" }))
            .await
            .unwrap();

        let renamed = json!({ "instrument": "DIGI", "isin": "RO123456789A", "issuer": "Digi Plc" });
        let updated = service.update(&p, digi_rec.id.as_str(), &renamed).await.unwrap();
        assert_eq!(updated.record.issuer, "Digi Plc");

        let clash = json!({ "instrument": "TLV", "isin": "RO123456789A", "issuer": "Digi" });
        let err = service.update(&p, digi_rec.id.as_str(), &clash).await.unwrap_err();
        assert!(matches!(err, ServiceError::Duplicate(_)));
    }

    #[tokio::test]
    async fn missing_records_are_not_found() {
        let store = Arc::new(MemoryStore::new());
        let service: ResourceService<PortfolioEntry> = ResourceService::new(store.clone());
        let absent = RecordId::generate();

        let err = service.delete(&partition(1), absent.as_str()).await.unwrap_err();
        assert_eq!(err.to_string(), "Portfolio entry not found");

        let err = service.delete(&partition(1), "xyz").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid portfolio entry ID format");
    }

    #[tokio::test]
    async fn delete_twice_succeeds_then_misses() {
        let store = Arc::new(MemoryStore::new());
        let service = companies(&store);
        let p = partition(1);
        let created = service.create(&p, &digi()).await.unwrap();

        service.delete(&p, created.id.as_str()).await.unwrap();
        let err = service.delete(&p, created.id.as_str()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn store_failures_carry_client_safe_messages() {
        let store = Arc::new(MemoryStore::new());
        let service: ResourceService<Deposit> = ResourceService::new(store.clone());
        store.set_unavailable(true);

        let err = service.list(&partition(1), &Default::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch deposits");
    }
}
