//! Synthetic demand data for demos and local development.
//!
//! Produces SKU-week sales with trend, yearly seasonality, gaussian noise,
//! occasional anomalies and promotions (with their marketing spend), plus a
//! naive capacity-constrained plan for the weeks that follow the history.

use std::f64::consts::PI;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use statrs::distribution::Normal;

use super::{PlanRecord, SalesRecord};

/// Parameters for [`generate`].
#[derive(Debug, Clone)]
pub struct GeneratorParams {
    pub num_skus: usize,
    pub weeks: usize,
    /// First history week, `YYYY-MM-DD`.
    pub start_date: String,
    /// Forecast horizon in weeks.
    pub horizon: usize,
    pub seed: u64,
}

impl Default for GeneratorParams {
    fn default() -> Self {
        Self {
            num_skus: 10,
            weeks: 104,
            start_date: "2024-01-01".to_string(),
            horizon: 12,
            seed: 42,
        }
    }
}

/// Generated dataset.
#[derive(Debug, Clone)]
pub struct GeneratedData {
    pub sales: Vec<SalesRecord>,
    pub plan: Vec<PlanRecord>,
}

/// Number of trailing weeks the naive baseline averages over.
const BASELINE_WINDOW: usize = 12;

/// Share of total baseline demand that fits in weekly capacity.
const CAPACITY_SHARE: f64 = 0.9;

pub fn generate(params: &GeneratorParams) -> Result<GeneratedData> {
    let start = NaiveDate::parse_from_str(&params.start_date, "%Y-%m-%d")
        .with_context(|| format!("invalid start date '{}'", params.start_date))?;
    let mut rng = StdRng::seed_from_u64(params.seed);

    let dates: Vec<NaiveDate> = (0..params.weeks)
        .map(|i| start + Duration::weeks(i as i64))
        .collect();

    let mut sales = Vec::with_capacity(params.num_skus * params.weeks);
    let mut baselines = Vec::with_capacity(params.num_skus);

    for sku_idx in 1..=params.num_skus {
        let sku = format!("SKU_{sku_idx:03}");
        let history = sales_history(&mut rng, params.weeks)?;

        for ((date, value), &promo) in dates.iter().zip(&history.sales).zip(&history.promo) {
            let spend: u32 = if promo {
                rng.gen_range(1000..5000)
            } else {
                rng.gen_range(0..500)
            };
            sales.push(SalesRecord {
                date: date.format("%Y-%m-%d").to_string(),
                sku: sku.clone(),
                sales: Some(value.trunc()),
                promo_flag: promo,
                marketing_spend: Some(f64::from(spend)),
            });
        }

        let series = &history.sales;
        let window = &series[series.len().saturating_sub(BASELINE_WINDOW)..];
        let baseline = if window.is_empty() {
            0.0
        } else {
            window.iter().sum::<f64>() / window.len() as f64
        };
        baselines.push((sku, baseline));
    }

    let last = dates.last().copied().unwrap_or(start - Duration::weeks(1));
    let plan = constrained_plan(&baselines, last, params.horizon);

    Ok(GeneratedData { sales, plan })
}

/// One SKU's weekly sales and the weeks it was on promotion.
struct SkuHistory {
    sales: Vec<f64>,
    promo: Vec<bool>,
}

/// Level + trend + seasonality + noise, then anomalies and promo lift.
fn sales_history(rng: &mut StdRng, weeks: usize) -> Result<SkuHistory> {
    let base = f64::from(rng.gen_range(100u32..1000));
    let trend_end: f64 = rng.gen_range(-0.5..0.5);
    let span = weeks.saturating_sub(1).max(1) as f64;
    let noise = Normal::new(0.0, base * 0.1).context("invalid noise distribution")?;

    let mut sales: Vec<f64> = (0..weeks)
        .map(|i| {
            let t = i as f64 / span;
            let trend = t * trend_end * base;
            let season = (t * 2.0 * PI).sin() * base * 0.2;
            (base + trend + season + rng.sample(noise)).max(0.0)
        })
        .collect();

    if weeks > 0 && rng.gen_bool(0.3) {
        let factor = if rng.gen_bool(0.5) { 0.1 } else { 3.0 };
        for _ in 0..2 {
            let idx = rng.gen_range(0..weeks);
            sales[idx] *= factor;
        }
    }

    let promo: Vec<bool> = (0..weeks).map(|_| rng.gen_bool(0.1)).collect();
    for (value, _) in sales.iter_mut().zip(&promo).filter(|(_, on)| **on) {
        *value += base * 0.5;
    }

    Ok(SkuHistory { sales, promo })
}

/// Flat baseline per SKU, scaled down uniformly when the week's total demand
/// exceeds capacity.
fn constrained_plan(baselines: &[(String, f64)], last: NaiveDate, horizon: usize) -> Vec<PlanRecord> {
    let total: f64 = baselines.iter().map(|(_, b)| b).sum();
    let capacity = total * CAPACITY_SHARE;
    let scale = if total > capacity && total > 0.0 {
        capacity / total
    } else {
        1.0
    };

    let mut plan = Vec::with_capacity(baselines.len() * horizon);
    for (sku, baseline) in baselines {
        for week in 1..=horizon {
            let date = last + Duration::weeks(week as i64);
            let constrained = (baseline * scale).round();
            let planned = baseline.round();
            plan.push(PlanRecord {
                sku: sku.clone(),
                date: date.format("%Y-%m-%d").to_string(),
                baseline_p50: Some(planned),
                plan: Some(planned),
                constrained_plan: Some(constrained),
                upside: Some((planned - constrained).max(0.0)),
            });
        }
    }
    plan
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
