//! HTTP handlers for the site settings resource.

use crate::authz::Caller;
use crate::error::{AppError, Result};
use crate::registry::Context;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use axum_extra::{
    extract::WithRejection,
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

type BearerHeader = Option<TypedHeader<Authorization<Bearer>>>;

/// Extractor wrappers turning axum's plain-text rejections into
/// [`AppError::InvalidRequest`], so 400s carry the problem-details body.
type ContextParam = WithRejection<Query<ContextQuery>, AppError>;
type JsonBody = WithRejection<Json<Value>, AppError>;

#[derive(Debug, Deserialize)]
pub struct ContextQuery {
    #[serde(default = "default_context")]
    context: Context,
}

const fn default_context() -> Context {
    Context::View
}

fn caller_from(auth: &BearerHeader) -> Caller {
    match auth {
        Some(TypedHeader(bearer)) => Caller::with_token(bearer.token()),
        None => Caller::anonymous(),
    }
}

/// `{ "<field>": value }` response shape, matching the item endpoints.
fn single_entry(field: String, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(field, value);
    Value::Object(map)
}

pub fn site_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/site", get(list_settings))
        .route("/api/v1/site/schema", get(schema))
        .route(
            "/api/v1/site/:field",
            get(get_setting).put(update_setting),
        )
        .route("/health", get(health_check))
}

/// `GET /api/v1/site` — every mapped setting, keyed by external name.
async fn list_settings(
    State(state): State<Arc<AppState>>,
    auth: BearerHeader,
    WithRejection(Query(query), _): ContextParam,
) -> Result<Json<Map<String, Value>>> {
    let caller = caller_from(&auth);
    let settings = state.facade.list(&caller, query.context).await?;
    Ok(Json(settings))
}

/// `GET /api/v1/site/schema` — the registry as a JSON Schema document.
/// Discovery endpoint, no capability required.
async fn schema(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(state.facade.registry().schema_document())
}

/// `GET /api/v1/site/:field` — a single resolved setting as a one-entry
/// object.
async fn get_setting(
    State(state): State<Arc<AppState>>,
    auth: BearerHeader,
    Path(field): Path<String>,
    WithRejection(Query(query), _): ContextParam,
) -> Result<Json<Value>> {
    let caller = caller_from(&auth);
    let value = state.facade.get(&caller, &field, query.context).await?;
    Ok(Json(single_entry(field, value)))
}

/// `PUT /api/v1/site/:field` — sanitize, persist and echo the canonical
/// value as a one-entry object.
///
/// The body is either a bare JSON value or an object carrying the field
/// name as a key; the keyed form wins when both could apply.
async fn update_setting(
    State(state): State<Arc<AppState>>,
    auth: BearerHeader,
    Path(field): Path<String>,
    WithRejection(Json(body), _): JsonBody,
) -> Result<Json<Value>> {
    let caller = caller_from(&auth);

    let raw = match body {
        Value::Object(ref map) if map.contains_key(&field) => map[field.as_str()].clone(),
        other => other,
    };

    let value = state.facade.update(&caller, &field, raw).await?;
    Ok(Json(single_entry(field, value)))
}

/// Liveness probe.
async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
