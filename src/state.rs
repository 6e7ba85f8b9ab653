//! Shared application state: the wired-up settings facade plus the loaded
//! configuration.

use crate::authz::{Authorizer, TokenAuthorizer};
use crate::config::AppConfig;
use crate::facade::SettingsFacade;
use crate::registry::FieldRegistry;
use crate::store::{MemoryStore, SettingsStore};
use std::sync::Arc;

pub struct AppState {
    pub config: AppConfig,
    pub facade: SettingsFacade,
}

impl AppState {
    /// Wire the default registry to an in-memory store and the token
    /// authorizer derived from configuration.
    pub fn new(config: AppConfig) -> Self {
        let authz = Arc::new(TokenAuthorizer::new(config.server.admin_token.clone()));
        let store = Arc::new(MemoryStore::new());
        Self::with_parts(config, Arc::new(FieldRegistry::site_defaults()), store, authz)
    }

    /// Wire explicit collaborators; used by tests and embedders that bring
    /// their own store or authorization.
    pub fn with_parts(
        config: AppConfig,
        registry: Arc<FieldRegistry>,
        store: Arc<dyn SettingsStore>,
        authz: Arc<dyn Authorizer>,
    ) -> Self {
        Self {
            config,
            facade: SettingsFacade::new(registry, store, authz),
        }
    }
}
