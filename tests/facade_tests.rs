// tests/facade_tests.rs

use async_trait::async_trait;
use serde_json::{json, Value};
use site_settings_api::{
    authz::{Authorizer, Caller, StaticAuthorizer},
    error::{AppError, Result},
    facade::SettingsFacade,
    registry::{Context, FieldDescriptor, FieldKind, FieldRegistry},
    store::{MemoryStore, SettingsStore},
};
use std::sync::Arc;

/// Store double whose every operation fails, standing in for an unreachable
/// backend.
struct FailingStore;

#[async_trait]
impl SettingsStore for FailingStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Err(AppError::store("get", format!("backend offline ({key})")))
    }

    async fn set(&self, key: &str, _value: Value) -> Result<()> {
        Err(AppError::store("set", format!("backend offline ({key})")))
    }
}

fn facade_with(store: Arc<MemoryStore>, authz: Arc<dyn Authorizer>) -> SettingsFacade {
    SettingsFacade::new(Arc::new(FieldRegistry::site_defaults()), store, authz)
}

fn open_facade() -> SettingsFacade {
    facade_with(
        Arc::new(MemoryStore::new()),
        Arc::new(StaticAuthorizer::allow_all()),
    )
}

#[tokio::test]
async fn fresh_store_yields_zero_values_or_defaults() {
    let facade = open_facade();
    let caller = Caller::anonymous();

    // No stored value, no default: the type's zero value.
    assert_eq!(
        facade.get(&caller, "title", Context::View).await.unwrap(),
        json!("")
    );
    assert_eq!(
        facade
            .get(&caller, "start_of_week", Context::View)
            .await
            .unwrap(),
        json!(0)
    );
    assert_eq!(
        facade
            .get(&caller, "users_can_register", Context::View)
            .await
            .unwrap(),
        json!(false)
    );

    // Declared defaults win over the zero value.
    assert_eq!(
        facade
            .get(&caller, "timezone_string", Context::View)
            .await
            .unwrap(),
        json!("UTC")
    );
    assert_eq!(
        facade.get(&caller, "locale", Context::View).await.unwrap(),
        json!("en_US")
    );
}

#[tokio::test]
async fn update_then_get_round_trips() {
    let facade = open_facade();
    let caller = Caller::anonymous();

    let updated = facade
        .update(&caller, "title", json!("New Title"))
        .await
        .unwrap();
    assert_eq!(updated, json!("New Title"));

    let read_back = facade.get(&caller, "title", Context::View).await.unwrap();
    assert_eq!(read_back, json!("New Title"));
}

#[tokio::test]
async fn update_applies_declared_sanitizer() {
    let facade = open_facade();
    let caller = Caller::anonymous();

    let title = facade
        .update(&caller, "title", json!("  <b>My</b>   Site\t"))
        .await
        .unwrap();
    assert_eq!(title, json!("My Site"));

    let day = facade
        .update(&caller, "start_of_week", json!("-3"))
        .await
        .unwrap();
    assert_eq!(day, json!(3));
}

#[tokio::test]
async fn update_returns_canonical_stored_value() {
    let facade = open_facade();
    let caller = Caller::anonymous();

    // No sanitizer on the boolean field: the raw string is stored, and the
    // response reflects the read-path coercion of what was persisted.
    let value = facade
        .update(&caller, "users_can_register", json!("yes"))
        .await
        .unwrap();
    assert_eq!(value, json!(true));

    let value = facade
        .update(&caller, "users_can_register", json!(""))
        .await
        .unwrap();
    assert_eq!(value, json!(false));
}

#[tokio::test]
async fn storing_an_empty_value_falls_back_to_default() {
    let facade = open_facade();
    let caller = Caller::anonymous();

    let tz = facade
        .update(&caller, "timezone_string", json!(""))
        .await
        .unwrap();
    assert_eq!(tz, json!("UTC"));
}

#[tokio::test]
async fn unknown_field_fails_regardless_of_authorization() {
    for authz in [StaticAuthorizer::allow_all(), StaticAuthorizer::deny_all()] {
        let facade = facade_with(Arc::new(MemoryStore::new()), Arc::new(authz));
        let err = facade
            .get(&Caller::anonymous(), "does-not-exist", Context::View)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnknownField { .. }));
    }
}

#[tokio::test]
async fn unauthorized_update_does_not_mutate_store() {
    let store = Arc::new(MemoryStore::new());
    let facade = facade_with(store.clone(), Arc::new(StaticAuthorizer::deny_all()));

    let err = facade
        .update(&Caller::anonymous(), "title", json!("Sneaky"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));

    let err = facade
        .update(&Caller::with_token("some-token"), "title", json!("Sneaky"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    assert_eq!(store.get("blogname").await.unwrap(), None);
}

#[tokio::test]
async fn list_requires_capability() {
    let facade = facade_with(
        Arc::new(MemoryStore::new()),
        Arc::new(StaticAuthorizer::deny_all()),
    );
    let err = facade
        .list(&Caller::anonymous(), Context::View)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));
}

#[tokio::test]
async fn list_returns_every_mapped_field() {
    let facade = open_facade();
    let settings = facade
        .list(&Caller::anonymous(), Context::View)
        .await
        .unwrap();

    assert_eq!(settings.len(), 13);
    assert_eq!(settings["timezone_string"], json!("UTC"));
    assert_eq!(settings["title"], json!(""));

    // Registration order is preserved.
    let names: Vec<&str> = settings.keys().map(String::as_str).collect();
    assert_eq!(names[0], "title");
    assert_eq!(names[1], "tagline");
    assert_eq!(*names.last().unwrap(), "permalink_tag_base");
}

#[tokio::test]
async fn list_skips_unmapped_descriptors() {
    let registry = FieldRegistry::new(vec![
        FieldDescriptor::new("mapped", FieldKind::String).storage_key("mapped_key"),
        FieldDescriptor::new("unmapped", FieldKind::String),
    ])
    .unwrap();
    let facade = SettingsFacade::new(
        Arc::new(registry),
        Arc::new(MemoryStore::new()),
        Arc::new(StaticAuthorizer::allow_all()),
    );

    let settings = facade
        .list(&Caller::anonymous(), Context::View)
        .await
        .unwrap();
    assert_eq!(settings.len(), 1);
    assert!(settings.contains_key("mapped"));
    assert!(!settings.contains_key("unmapped"));

    // The item paths treat the unmapped descriptor as unknown.
    let err = facade
        .get(&Caller::anonymous(), "unmapped", Context::View)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::UnknownField { .. }));
}

#[tokio::test]
async fn store_failure_propagates_without_retry() {
    let facade = SettingsFacade::new(
        Arc::new(FieldRegistry::site_defaults()),
        Arc::new(FailingStore),
        Arc::new(StaticAuthorizer::allow_all()),
    );
    let caller = Caller::anonymous();

    let err = facade.get(&caller, "title", Context::View).await.unwrap_err();
    assert!(matches!(err, AppError::Store { ref operation, .. } if operation == "get"));
    assert!(err.status_code().is_server_error());

    let err = facade
        .update(&caller, "title", json!("New Title"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Store { ref operation, .. } if operation == "set"));

    let err = facade
        .list(&caller, Context::View)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Store { .. }));
}

#[tokio::test]
async fn seeded_store_values_are_coerced_on_read() {
    let store = Arc::new(MemoryStore::seeded([
        ("blogname".to_string(), json!("My Blog")),
        ("users_can_register".to_string(), json!("1")),
        ("start_of_week".to_string(), Value::String("2".to_string())),
    ]));
    let facade = facade_with(store, Arc::new(StaticAuthorizer::allow_all()));
    let caller = Caller::anonymous();

    assert_eq!(
        facade.get(&caller, "title", Context::View).await.unwrap(),
        json!("My Blog")
    );
    assert_eq!(
        facade
            .get(&caller, "users_can_register", Context::View)
            .await
            .unwrap(),
        json!(true)
    );
    assert_eq!(
        facade
            .get(&caller, "start_of_week", Context::View)
            .await
            .unwrap(),
        json!(2)
    );
}
