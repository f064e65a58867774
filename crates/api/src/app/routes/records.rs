//! Generic CRUD routes shared by every collaborator registry.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use storeops_core::{DocumentId, Record};

use crate::app::services::{AppServices, RegistryOf};
use crate::app::{dto, errors};

/// `/` lists and creates, `/:id` reads, replaces and deletes.
/// With `resettable`, `DELETE /` clears the whole collection.
pub fn router<T>(resettable: bool) -> Router
where
    T: Record,
    AppServices: RegistryOf<T>,
{
    let mut root = get(list::<T>).post(add::<T>);
    if resettable {
        root = root.delete(reset::<T>);
    }
    Router::new()
        .route("/", root)
        .route("/:id", get(get_one::<T>).put(update::<T>).delete(delete::<T>))
}

pub(crate) fn parse_id(id: &str) -> Result<DocumentId, axum::response::Response> {
    id.parse().map_err(|_| errors::invalid_id("record"))
}

pub async fn list<T>(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response
where
    T: Record,
    AppServices: RegistryOf<T>,
{
    let snapshot = RegistryOf::<T>::registry(&*services).snapshot();
    (StatusCode::OK, Json(dto::ItemsResponse { items: snapshot.to_vec() })).into_response()
}

pub async fn add<T>(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<T>,
) -> axum::response::Response
where
    T: Record,
    AppServices: RegistryOf<T>,
{
    match RegistryOf::<T>::registry(&*services).add(body).await {
        Ok(entry) => (StatusCode::CREATED, Json(entry)).into_response(),
        Err(e) => errors::registry_error_to_response(e),
    }
}

pub async fn get_one<T>(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response
where
    T: Record,
    AppServices: RegistryOf<T>,
{
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match RegistryOf::<T>::registry(&*services).get(id) {
        Some(entry) => (StatusCode::OK, Json(entry)).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "record not found"),
    }
}

pub async fn update<T>(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<T>,
) -> axum::response::Response
where
    T: Record,
    AppServices: RegistryOf<T>,
{
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match RegistryOf::<T>::registry(&*services).update(id, body).await {
        Ok(entry) => (StatusCode::OK, Json(entry)).into_response(),
        Err(e) => errors::registry_error_to_response(e),
    }
}

pub async fn delete<T>(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response
where
    T: Record,
    AppServices: RegistryOf<T>,
{
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match RegistryOf::<T>::registry(&*services).delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::registry_error_to_response(e),
    }
}

pub async fn reset<T>(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response
where
    T: Record,
    AppServices: RegistryOf<T>,
{
    match RegistryOf::<T>::registry(&*services).reset().await {
        Ok(removed) => (StatusCode::OK, Json(dto::ResetResponse { removed })).into_response(),
        Err(e) => errors::registry_error_to_response(e),
    }
}
