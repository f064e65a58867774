use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use storeops_purchasing::{Order, OrderDraft};

use crate::app::errors;
use crate::app::routes::records;
use crate::app::services::AppServices;

/// Orders take a draft on create and update: the order number is assigned
/// by the service and the total is always recomputed from the lines.
pub fn router() -> Router {
    Router::new()
        .route("/", get(records::list::<Order>).post(create_order))
        .route(
            "/:id",
            get(records::get_one::<Order>)
                .put(update_order)
                .delete(records::delete::<Order>),
        )
}

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<OrderDraft>,
) -> axum::response::Response {
    match services.create_order(body).await {
        Ok(entry) => (StatusCode::CREATED, Json(entry)).into_response(),
        Err(e) => errors::registry_error_to_response(e),
    }
}

pub async fn update_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<OrderDraft>,
) -> axum::response::Response {
    let id = match records::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.update_order(id, body).await {
        Ok(entry) => (StatusCode::OK, Json(entry)).into_response(),
        Err(e) => errors::registry_error_to_response(e),
    }
}
