use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde_json::{json, Value};
use service::{errors::ServiceError, CollectionKind, CollectionSpec, Record};

use common::types::Message;

use super::ServerState;
use crate::errors::JsonApiError;

type Spec = Extension<&'static CollectionSpec>;

/// Routes for one collection, mounted at `spec.route`.
///
/// Lists get `GET/POST <route>` and `GET/PUT/DELETE <route>/:id`;
/// singletons get `GET/PUT <route>`.
pub fn collection_router(spec: &'static CollectionSpec) -> Router<ServerState> {
    let router = match spec.kind {
        CollectionKind::List => Router::new()
            .route(spec.route, get(list_all).post(create))
            .route(&format!("{}/:id", spec.route), get(get_one).put(update).delete(remove)),
        CollectionKind::Singleton => Router::new()
            .route(spec.route, get(list_all).put(replace_singleton)),
    };
    router.layer(Extension(spec))
}

/// Take the record out of a request body: the nested `item` object when
/// there is one, the body itself otherwise.
pub fn extract_payload(body: Value) -> Result<Record, ServiceError> {
    match body {
        Value::Object(mut obj) => match obj.remove("item") {
            Some(Value::Object(item)) => Ok(item),
            Some(other) => {
                obj.insert("item".to_string(), other);
                Ok(obj)
            }
            None => Ok(obj),
        },
        other => Err(ServiceError::Validation(format!(
            "request body must be a JSON object, got {other}"
        ))),
    }
}

pub async fn list_all(
    State(state): State<ServerState>,
    Extension(spec): Spec,
) -> Result<Json<Value>, JsonApiError> {
    Ok(Json(state.store.get_all(spec.key).await?))
}

pub async fn get_one(
    State(state): State<ServerState>,
    Extension(spec): Spec,
    Path(id): Path<String>,
) -> Result<Json<Record>, JsonApiError> {
    Ok(Json(state.store.get_by_id(spec.key, &id).await?))
}

pub async fn create(
    State(state): State<ServerState>,
    Extension(spec): Spec,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Record>), JsonApiError> {
    let Json(body) = body?;
    let payload = extract_payload(body)?;
    let created = state.store.create(spec.key, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update(
    State(state): State<ServerState>,
    Extension(spec): Spec,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, JsonApiError> {
    let Json(body) = body?;
    let payload = extract_payload(body)?;
    let item = state.store.update(spec.key, &id, payload).await?;
    Ok(Json(json!({"message": "Item updated", "item": item})))
}

pub async fn remove(
    State(state): State<ServerState>,
    Extension(spec): Spec,
    Path(id): Path<String>,
) -> Result<Json<Message<'static>>, JsonApiError> {
    state.store.delete(spec.key, &id).await?;
    Ok(Json(Message { message: "Item deleted" }))
}

pub async fn replace_singleton(
    State(state): State<ServerState>,
    Extension(spec): Spec,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Record>, JsonApiError> {
    let Json(body) = body?;
    let payload = extract_payload(body)?;
    Ok(Json(state.store.update_singleton(spec.key, payload).await?))
}
