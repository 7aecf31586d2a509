pub mod manager;
pub mod memory;
pub mod partition;
pub mod postgres;
pub mod store;
pub mod tables;

pub use manager::DatabaseManager;
pub use memory::MemoryStore;
pub use partition::Partition;
pub use postgres::PgStore;
pub use store::{CredentialStore, RecordStore, StoreError};
