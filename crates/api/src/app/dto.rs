use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use storeops_inventory::{CategoryBreakdown, StockSummary};
use storeops_sales::{
    DailyTotals, DashboardStats, Period, SalesCategory, SalesComparison, SellerRanking,
};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct SellRequest {
    pub quantity: i64,
}

/// Optional reference day for date-relative views (`?today=2026-10-19`).
#[derive(Debug, Default, Deserialize)]
pub struct TodayQuery {
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct MarketShareQuery {
    pub category: SalesCategory,
    #[serde(default = "default_period")]
    pub period: Period,
    pub today: Option<NaiveDate>,
}

fn default_period() -> Period {
    Period::Day
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct ItemsResponse<T> {
    pub items: Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: StockSummary,
    pub categories: Vec<CategoryBreakdown>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub today: NaiveDate,
    pub stats: DashboardStats,
    pub daily: Vec<DailyTotals>,
    pub top_sellers: Vec<SellerRanking>,
}

/// `today` inside the comparison is a sale count, so the day goes under `date`.
#[derive(Debug, Serialize)]
pub struct ComparisonResponse {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub comparison: SalesComparison,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub removed: usize,
}
