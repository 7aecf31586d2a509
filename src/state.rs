use std::sync::Arc;

use crate::auth::SessionService;
use crate::config::AppConfig;
use crate::database::{CredentialStore, RecordStore};
use crate::models::{Company, Deposit, PortfolioEntry};
use crate::services::{AuthService, ResourceService};

/// Shared handler state. Everything inside is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sessions: Arc<SessionService>,
    pub credentials: Arc<dyn CredentialStore>,
    pub auth: AuthService,
    pub companies: ResourceService<Company>,
    pub portfolio: ResourceService<PortfolioEntry>,
    pub deposits: ResourceService<Deposit>,
}

impl AppState {
    /// Wires every service to one backing store.
    pub fn new<S>(config: Arc<AppConfig>, store: Arc<S>) -> Self
    where
        S: CredentialStore
            + RecordStore<Company>
            + RecordStore<PortfolioEntry>
            + RecordStore<Deposit>
            + 'static,
    {
        let sessions = Arc::new(SessionService::from_config(&config));
        let credentials: Arc<dyn CredentialStore> = store.clone();

        Self {
            auth: AuthService::new(credentials.clone(), sessions.clone()),
            companies: ResourceService::new(store.clone()),
            portfolio: ResourceService::new(store.clone()),
            deposits: ResourceService::new(store),
            config,
            sessions,
            credentials,
        }
    }
}
