//! Sales domain module.
//!
//! Sale and competitor-sale records plus the dashboard analytics derived from
//! them. Pure functions over already-loaded data (no IO, no storage).

pub mod analytics;
pub mod sale;

pub use analytics::{
    BrandUnits, DailyTotals, DashboardStats, MarketShare, Period, SalesComparison, SellerRanking,
    daily_series, percent_change, top_sellers,
};
pub use sale::{CompetitorSale, Sale, SalesCategory};
