pub mod company;
pub mod deposit;
pub mod id;
pub mod portfolio;
pub mod user;

use std::cmp::Ordering;

use serde::Serialize;
use serde_json::Value;

use crate::validation::ValidationErrors;

pub use company::Company;
pub use deposit::{Deposit, DepositFilter};
pub use id::{InvalidRecordId, RecordId};
pub use portfolio::{Currency, DateFilter, PortfolioEntry, PortfolioFilter};
pub use user::{AuthenticatedUser, UserRecord};

/// A record type kept in a user's partition.
///
/// Implementors own their payload schema, their natural key and the order in
/// which listings are returned; the services and stores stay generic.
pub trait Resource: Clone + PartialEq + Serialize + Send + Sync + 'static {
    type Filter: Clone + Default + Send + Sync + 'static;

    /// Table / collection name inside a partition.
    const COLLECTION: &'static str;
    /// Lowercase singular noun used in client-facing messages.
    const SINGULAR: &'static str;
    /// Lowercase plural noun used in client-facing messages.
    const PLURAL: &'static str;
    const DUPLICATE_MESSAGE: &'static str;

    fn validate(payload: &Value) -> Result<Self, ValidationErrors>;

    fn same_natural_key(&self, other: &Self) -> bool;

    fn matches(&self, filter: &Self::Filter) -> bool;

    fn list_order(&self, other: &Self) -> Ordering;
}

/// A record together with the id the store assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stored<R> {
    pub id: RecordId,
    #[serde(flatten)]
    pub record: R,
}

impl<R> Stored<R> {
    pub fn new(id: RecordId, record: R) -> Self {
        Self { id, record }
    }
}

/// "company" -> "Company", for messages that start with the noun.
pub(crate) fn capitalized(noun: &str) -> String {
    let mut chars = noun.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
