//! Dashboard summary: recent sales, forecast totals, and top products.
//!
//! Mirrors the three overview charts: total historical sales for the last
//! N weeks, total constrained forecast per week, and the SKUs with the most
//! forecast volume.

use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::chart::{ChartConfig, ChartKind, SeriesChart};
use crate::config::BoardConfig;
use crate::data::{AppState, PlanRecord, SalesRecord};

/// A dated total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatePoint {
    pub date: String,
    pub value: f64,
}

/// Forecast volume for one SKU.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductTotal {
    pub sku: String,
    pub total: f64,
}

/// Everything the overview page shows.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub historical: Vec<DatePoint>,
    pub forecast: Vec<DatePoint>,
    pub top_products: Vec<ProductTotal>,
    pub charts: DashboardCharts,
}

/// Ready-to-render chart documents.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardCharts {
    pub history: ChartConfig,
    pub forecast: ChartConfig,
    pub top_products: ChartConfig,
}

/// Build the dashboard from a state snapshot.
pub fn build(state: &AppState, config: &BoardConfig) -> DashboardData {
    let historical = recent_sales(&state.sales, config.data.history_weeks);
    let forecast = forecast_totals(&state.plan);
    let top_products = top_products(&state.plan, config.data.top_products);
    let threshold = config.chart.decimation_threshold;

    let (labels, values) = split(&historical);
    let history = SeriesChart::new(ChartKind::Line, "Total Historical Sales")
        .points(labels, values)
        .axes("Week", "Sales Qty")
        .build(threshold);

    let (labels, values) = split(&forecast);
    let forecast_chart = SeriesChart::new(ChartKind::Line, "Total Forecast (Constrained)")
        .points(labels, values)
        .axes("Week", "Forecast Qty")
        .build(threshold);

    let top_chart = SeriesChart::new(ChartKind::Bar, "Forecast Volume")
        .points(
            top_products.iter().map(|p| p.sku.clone()).collect(),
            top_products.iter().map(|p| p.total).collect(),
        )
        .axes("Product", "Total Qty")
        .build(threshold);

    DashboardData {
        historical,
        forecast,
        top_products,
        charts: DashboardCharts {
            history,
            forecast: forecast_chart,
            top_products: top_chart,
        },
    }
}

fn split(points: &[DatePoint]) -> (Vec<String>, Vec<f64>) {
    points.iter().map(|p| (p.date.clone(), p.value)).unzip()
}

fn parse_date(date: &str) -> Option<NaiveDate> {
    let day = date.get(..10).unwrap_or(date);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Sales summed per date, for dates strictly after `latest - weeks`.
///
/// Rows whose date doesn't parse are ignored. Missing sales count as 0.
pub fn recent_sales(sales: &[SalesRecord], weeks: u32) -> Vec<DatePoint> {
    let dated: Vec<(NaiveDate, &SalesRecord)> = sales
        .iter()
        .filter_map(|s| parse_date(&s.date).map(|d| (d, s)))
        .collect();

    let Some(latest) = dated.iter().map(|(d, _)| *d).max() else {
        return Vec::new();
    };
    let start = latest - Duration::weeks(i64::from(weeks));

    let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (date, rec) in dated {
        if date > start {
            *totals.entry(date).or_default() += rec.sales.unwrap_or(0.0);
        }
    }

    totals
        .into_iter()
        .map(|(date, value)| DatePoint {
            date: date.format("%Y-%m-%d").to_string(),
            value,
        })
        .collect()
}

/// `Constrained_Plan` summed per date, ascending by date string.
pub fn forecast_totals(plan: &[PlanRecord]) -> Vec<DatePoint> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for rec in plan {
        *totals.entry(rec.date.as_str()).or_default() += rec.constrained_plan.unwrap_or(0.0);
    }
    totals
        .into_iter()
        .map(|(date, value)| DatePoint {
            date: date.to_string(),
            value,
        })
        .collect()
}

/// The `n` SKUs with the largest total `Constrained_Plan`, descending.
/// Equal totals are ordered by SKU.
pub fn top_products(plan: &[PlanRecord], n: usize) -> Vec<ProductTotal> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for rec in plan {
        *totals.entry(rec.sku.as_str()).or_default() += rec.constrained_plan.unwrap_or(0.0);
    }

    let mut ranked: Vec<ProductTotal> = totals
        .into_iter()
        .map(|(sku, total)| ProductTotal {
            sku: sku.to_string(),
            total,
        })
        .collect();
    ranked.sort_by(|a, b| b.total.total_cmp(&a.total).then_with(|| a.sku.cmp(&b.sku)));
    ranked.truncate(n);
    ranked
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sale(date: &str, sku: &str, v: Option<f64>) -> SalesRecord {
        SalesRecord::new(date, sku, v)
    }

    fn plan(sku: &str, date: &str, v: f64) -> PlanRecord {
        PlanRecord {
            constrained_plan: Some(v),
            ..PlanRecord::new(sku, date)
        }
    }

    #[test]
    fn recent_sales_window_excludes_boundary() {
        let sales = vec![
            sale("2024-01-01", "A", Some(1.0)),
            sale("2024-01-08", "A", Some(2.0)),
            sale("2024-01-15", "A", Some(3.0)),
            sale("2024-01-15", "B", Some(4.0)),
            sale("garbage", "B", Some(100.0)),
        ];
        // latest 01-15, two weeks back is 01-01 which is excluded
        let points = recent_sales(&sales, 2);
        assert_eq!(
            points,
            vec![
                DatePoint { date: "2024-01-08".into(), value: 2.0 },
                DatePoint { date: "2024-01-15".into(), value: 7.0 },
            ]
        );
    }

    #[test]
    fn recent_sales_empty_input() {
        assert!(recent_sales(&[], 12).is_empty());
    }

    #[test]
    fn recent_sales_missing_values_count_zero() {
        let sales = vec![sale("2024-01-15", "A", None), sale("2024-01-15", "B", Some(5.0))];
        assert_eq!(recent_sales(&sales, 12)[0].value, 5.0);
    }

    #[test]
    fn forecast_totals_sum_per_date() {
        let records = vec![
            plan("A", "2024-04-07", 10.0),
            plan("B", "2024-04-07", 5.0),
            plan("A", "2024-03-31", 1.0),
        ];
        let totals = forecast_totals(&records);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].date, "2024-03-31");
        assert_eq!(totals[1].value, 15.0);
    }

    #[test]
    fn top_products_ranked_and_truncated() {
        let records = vec![
            plan("A", "d1", 5.0),
            plan("B", "d1", 9.0),
            plan("C", "d1", 5.0),
            plan("A", "d2", 1.0),
            plan("D", "d1", 0.5),
        ];
        let top = top_products(&records, 3);
        let skus: Vec<&str> = top.iter().map(|p| p.sku.as_str()).collect();
        assert_eq!(skus, vec!["B", "A", "C"]);
        assert_eq!(top[1].total, 6.0);
    }

    #[test]
    fn build_decimates_long_lines_but_not_bars() {
        let mut state = AppState::default();
        let start = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        for week in 0..30 {
            let date = (start + Duration::weeks(week)).format("%Y-%m-%d").to_string();
            state.plan.push(plan("A", &date, week as f64));
        }
        for sku in ["B", "C", "D", "E", "F", "G"] {
            state.plan.push(plan(sku, "2024-01-07", 1.0));
        }

        let data = build(&state, &BoardConfig::default());
        assert_eq!(data.forecast.len(), 30);
        assert!(data.charts.forecast.point_count() <= 3);
        assert_eq!(data.charts.top_products.kind, ChartKind::Bar);
        assert_eq!(data.charts.top_products.point_count(), 5);
        assert_eq!(data.charts.history.point_count(), 0);
    }
}
