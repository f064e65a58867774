use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use storeops_core::Record;
use storeops_infra::Registry;
use storeops_sales::{
    DashboardStats, MarketShare, SalesComparison, daily_series, top_sellers,
};

use crate::app::dto;
use crate::app::services::{self, AppServices, Store};

const DASHBOARD_DAYS: u32 = 7;
const TOP_SELLERS: usize = 3;

pub fn router() -> Router {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/comparison", get(comparison))
        .route("/market-share", get(market_share))
}

fn records<T: Record>(registry: &Registry<Store, T>) -> Vec<T> {
    registry.snapshot().iter().map(|e| e.record.clone()).collect()
}

pub async fn dashboard(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::TodayQuery>,
) -> axum::response::Response {
    let today = services::today_or(query.today);
    let sales = records(&services.sales);
    let body = dto::DashboardResponse {
        today,
        stats: DashboardStats::compute(&sales, today),
        daily: daily_series(&sales, today, DASHBOARD_DAYS),
        top_sellers: top_sellers(&sales, TOP_SELLERS),
    };
    (StatusCode::OK, Json(body)).into_response()
}

pub async fn comparison(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::TodayQuery>,
) -> axum::response::Response {
    let today = services::today_or(query.today);
    let sales = records(&services.sales);
    let body = dto::ComparisonResponse {
        date: today,
        comparison: SalesComparison::compute(&sales, today),
    };
    (StatusCode::OK, Json(body)).into_response()
}

pub async fn market_share(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::MarketShareQuery>,
) -> axum::response::Response {
    let today = services::today_or(query.today);
    let share = MarketShare::compute(
        query.category,
        query.period,
        today,
        &records(&services.sales),
        &records(&services.competitor_sales),
    );
    (StatusCode::OK, Json(share)).into_response()
}
