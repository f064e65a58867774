//! Dashboard aggregations over sales records.
//!
//! Every function takes the reference day explicitly so results do not
//! depend on the wall clock.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::sale::{CompetitorSale, Sale, SalesCategory};

/// Brand label used for in-house units in market-share breakdowns.
pub const IN_HOUSE_BRAND: &str = "Apple";

/// Relative change from `previous` to `current`, in percent.
///
/// With no previous activity the change is 100 if there is current activity
/// and 0 otherwise. Changes too large for a `Decimal` saturate.
pub fn percent_change(current: Decimal, previous: Decimal) -> Decimal {
    if previous.is_zero() {
        return if current > Decimal::ZERO {
            Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };
    }
    let delta = current.saturating_sub(previous);
    delta
        .checked_div(previous)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or_else(|| {
            if delta.is_sign_negative() == previous.is_sign_negative() {
                Decimal::MAX
            } else {
                Decimal::MIN
            }
        })
}

/// `day` moved back `n` days, or `None` before the first representable date.
fn days_before(day: NaiveDate, n: i64) -> Option<NaiveDate> {
    day.checked_sub_signed(Duration::days(n))
}

fn revenue_on<'a>(sales: impl IntoIterator<Item = &'a Sale>, day: NaiveDate) -> (usize, Decimal) {
    sales
        .into_iter()
        .filter(|s| s.date == day)
        .fold((0, Decimal::ZERO), |(n, total), s| {
            (n + 1, total.saturating_add(s.total_price))
        })
}

/// Headline sales figures for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub today_sales: usize,
    pub today_revenue: Decimal,
    pub yesterday_revenue: Decimal,
    pub revenue_change: Decimal,
}

impl DashboardStats {
    pub fn compute(sales: &[Sale], today: NaiveDate) -> Self {
        let (today_sales, today_revenue) = revenue_on(sales, today);
        let yesterday_revenue = days_before(today, 1)
            .map(|day| revenue_on(sales, day).1)
            .unwrap_or(Decimal::ZERO);
        Self {
            today_sales,
            today_revenue,
            yesterday_revenue,
            revenue_change: percent_change(today_revenue, yesterday_revenue),
        }
    }
}

/// Revenue and units for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyTotals {
    pub date: NaiveDate,
    pub revenue: Decimal,
    pub units: i64,
}

/// Per-day totals for the `days` days ending at `today`, oldest first.
///
/// Days before the first representable date are left out.
pub fn daily_series(sales: &[Sale], today: NaiveDate, days: u32) -> Vec<DailyTotals> {
    (0..i64::from(days))
        .rev()
        .filter_map(|offset| days_before(today, offset))
        .map(|date| {
            let (revenue, units) = sales
                .iter()
                .filter(|s| s.date == date)
                .fold((Decimal::ZERO, 0i64), |(r, u), s| {
                    (r.saturating_add(s.total_price), u.saturating_add(s.quantity))
                });
            DailyTotals {
                date,
                revenue,
                units,
            }
        })
        .collect()
}

/// Aggregate performance of one seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SellerRanking {
    pub seller: String,
    pub sales: usize,
    pub revenue: Decimal,
    pub units: i64,
}

/// Sellers ranked by revenue (highest first), at most `limit` entries.
///
/// Equal revenue falls back to seller name so the ranking is stable.
pub fn top_sellers(sales: &[Sale], limit: usize) -> Vec<SellerRanking> {
    let mut by_seller: BTreeMap<&str, SellerRanking> = BTreeMap::new();
    for s in sales {
        let entry = by_seller.entry(s.seller.as_str()).or_insert_with(|| SellerRanking {
            seller: s.seller.clone(),
            sales: 0,
            revenue: Decimal::ZERO,
            units: 0,
        });
        entry.sales += 1;
        entry.revenue = entry.revenue.saturating_add(s.total_price);
        entry.units = entry.units.saturating_add(s.quantity);
    }

    let mut ranked: Vec<SellerRanking> = by_seller.into_values().collect();
    ranked.sort_by(|a, b| b.revenue.cmp(&a.revenue).then_with(|| a.seller.cmp(&b.seller)));
    ranked.truncate(limit);
    ranked
}

/// Today's sale count against yesterday and the same weekday last week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesComparison {
    pub today: usize,
    pub yesterday: usize,
    pub same_day_last_week: usize,
    pub daily_change: Decimal,
    pub weekly_change: Decimal,
}

impl SalesComparison {
    pub fn compute(sales: &[Sale], today: NaiveDate) -> Self {
        let count_on = |day: Option<NaiveDate>| {
            day.map_or(0, |day| sales.iter().filter(|s| s.date == day).count())
        };
        let today_count = count_on(Some(today));
        let yesterday = count_on(days_before(today, 1));
        let same_day_last_week = count_on(days_before(today, 7));
        Self {
            today: today_count,
            yesterday,
            same_day_last_week,
            daily_change: percent_change(Decimal::from(today_count), Decimal::from(yesterday)),
            weekly_change: percent_change(
                Decimal::from(today_count),
                Decimal::from(same_day_last_week),
            ),
        }
    }
}

/// Window a market-share figure is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    /// Calendar week containing the reference day, Sunday through Saturday.
    Week,
}

impl Period {
    /// Inclusive date range of the period around `today`, clipped to the
    /// representable calendar.
    pub fn range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            Period::Day => (today, today),
            Period::Week => {
                let start = days_before(today, i64::from(today.weekday().num_days_from_sunday()))
                    .unwrap_or(NaiveDate::MIN);
                let end = start
                    .checked_add_signed(Duration::days(6))
                    .unwrap_or(NaiveDate::MAX);
                (start, end)
            }
        }
    }

    fn contains(&self, today: NaiveDate, date: NaiveDate) -> bool {
        let (start, end) = self.range(today);
        start <= date && date <= end
    }
}

/// Units attributed to one brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrandUnits {
    pub brand: String,
    pub units: i64,
}

/// In-house share of units sold in one category over one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketShare {
    pub category: SalesCategory,
    pub period: Period,
    pub in_house_units: i64,
    pub competitor_units: i64,
    pub total_units: i64,
    /// `in_house / total × 100`, or 0 when nothing was sold.
    pub share: Decimal,
    /// Tracked competitor brands in display order, then the in-house brand.
    pub brands: Vec<BrandUnits>,
}

impl MarketShare {
    pub fn compute(
        category: SalesCategory,
        period: Period,
        today: NaiveDate,
        sales: &[Sale],
        competitor_sales: &[CompetitorSale],
    ) -> Self {
        let in_house_units: i64 = sales
            .iter()
            .filter(|s| s.category == category && period.contains(today, s.date))
            .map(|s| s.quantity)
            .fold(0, i64::saturating_add);

        let competitors: Vec<&CompetitorSale> = competitor_sales
            .iter()
            .filter(|c| c.category == category && period.contains(today, c.date))
            .collect();
        let competitor_units = competitors.iter().map(|c| c.units).fold(0, i64::saturating_add);

        let mut brands: Vec<BrandUnits> = category
            .competitor_brands()
            .iter()
            .map(|brand| BrandUnits {
                brand: (*brand).to_string(),
                units: competitors
                    .iter()
                    .filter(|c| c.brand == *brand)
                    .map(|c| c.units)
                    .fold(0, i64::saturating_add),
            })
            .collect();
        brands.push(BrandUnits {
            brand: IN_HOUSE_BRAND.to_string(),
            units: in_house_units,
        });

        let total_units = in_house_units.saturating_add(competitor_units);
        let share = if total_units > 0 {
            Decimal::from(in_house_units) / Decimal::from(total_units) * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };

        Self {
            category,
            period,
            in_house_units,
            competitor_units,
            total_units,
            share,
            brands,
        }
    }
}
