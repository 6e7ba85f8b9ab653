//! The settings facade: read and write pipelines over the field registry,
//! the settings store and the authorization interface.

use crate::authz::{Authorizer, Caller, CAP_MANAGE_SETTINGS};
use crate::error::{AppError, Result};
use crate::registry::{is_empty_value, Context, FieldDescriptor, FieldRegistry};
use crate::store::SettingsStore;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

pub struct SettingsFacade {
    registry: Arc<FieldRegistry>,
    store: Arc<dyn SettingsStore>,
    authz: Arc<dyn Authorizer>,
}

impl SettingsFacade {
    pub fn new(
        registry: Arc<FieldRegistry>,
        store: Arc<dyn SettingsStore>,
        authz: Arc<dyn Authorizer>,
    ) -> Self {
        Self {
            registry,
            store,
            authz,
        }
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    /// Resolve every mapped field, in registration order.
    ///
    /// Descriptors without a storage key are skipped, so the result size
    /// equals the count of mapped descriptors.
    pub async fn list(&self, caller: &Caller, context: Context) -> Result<Map<String, Value>> {
        self.authorize(caller).await?;
        debug!(?context, "listing site settings");

        let mut result = Map::new();
        for field in self.registry.iter() {
            if field.storage_key.is_none() {
                continue;
            }
            result.insert(field.name.clone(), self.resolve(field).await?);
        }
        Ok(result)
    }

    /// Resolve a single field by external name.
    ///
    /// An unknown name fails before the capability check, so probing for
    /// fields never depends on authorization.
    pub async fn get(&self, caller: &Caller, name: &str, context: Context) -> Result<Value> {
        let field = self.lookup_mapped(name)?;
        self.authorize(caller).await?;
        debug!(field = name, ?context, "reading site setting");

        self.resolve(field).await
    }

    /// Sanitize and persist a single field, then re-read it so the response
    /// reflects the stored state rather than the raw input.
    pub async fn update(&self, caller: &Caller, name: &str, raw: Value) -> Result<Value> {
        self.authorize(caller).await?;
        let field = self.lookup_mapped(name)?;

        let validated = match field.sanitizer {
            Some(sanitizer) => sanitizer.apply(&raw),
            None => raw,
        };

        // storage_key presence checked by lookup_mapped
        let storage_key = field.storage_key.as_deref().unwrap_or_default();
        self.store.set(storage_key, validated).await?;
        info!(field = name, storage_key, "site setting updated");

        self.get(caller, name, Context::Edit).await
    }

    async fn authorize(&self, caller: &Caller) -> Result<()> {
        if self.authz.caller_can(caller, CAP_MANAGE_SETTINGS).await {
            return Ok(());
        }
        if caller.is_anonymous() {
            Err(AppError::Unauthorized)
        } else {
            Err(AppError::Forbidden)
        }
    }

    /// Descriptor lookup; unmapped descriptors are indistinguishable from
    /// unknown names on the item paths.
    fn lookup_mapped(&self, name: &str) -> Result<&FieldDescriptor> {
        self.registry
            .lookup(name)
            .filter(|field| field.storage_key.is_some())
            .ok_or_else(|| AppError::UnknownField {
                name: name.to_string(),
            })
    }

    /// Fetch, default-substitute and coerce a mapped field's value.
    async fn resolve(&self, field: &FieldDescriptor) -> Result<Value> {
        let storage_key = field.storage_key.as_deref().unwrap_or_default();
        let stored = self.store.get(storage_key).await?.unwrap_or(Value::Null);

        let effective = match &field.default {
            Some(default) if is_empty_value(&stored) => default.clone(),
            _ => stored,
        };

        Ok(field.kind.coerce(&effective))
    }
}
