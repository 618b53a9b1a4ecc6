//! Weekly → monthly re-bucketing of plan records.

use std::borrow::Cow;
use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data::PlanRecord;

/// Time granularity of the table columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    #[default]
    Weekly,
    Monthly,
}

impl FromStr for Bucket {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" | "week" | "w" => Ok(Self::Weekly),
            "monthly" | "month" | "m" => Ok(Self::Monthly),
            other => anyhow::bail!("unknown bucket '{other}' (expected weekly or monthly)"),
        }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Weekly => write!(f, "weekly"),
            Self::Monthly => write!(f, "monthly"),
        }
    }
}

/// Length of a `YYYY-MM` month key.
const MONTH_KEY_LEN: usize = 7;

/// Month key for a date: its first seven characters.
///
/// Shorter or malformed dates are used as-is; they form their own group
/// instead of being rejected.
pub fn month_key(date: &str) -> &str {
    match date.char_indices().nth(MONTH_KEY_LEN) {
        Some((end, _)) => &date[..end],
        None => date,
    }
}

/// Re-express `records` at the given granularity.
///
/// Weekly borrows the input unchanged. Monthly groups by (SKU, month key)
/// and sums every metric, counting empty values as 0, so every output
/// metric is `Some`. Groups keep the order in which they were first seen.
pub fn aggregate(records: &[PlanRecord], bucket: Bucket) -> Cow<'_, [PlanRecord]> {
    match bucket {
        Bucket::Weekly => Cow::Borrowed(records),
        Bucket::Monthly => Cow::Owned(aggregate_monthly(records)),
    }
}

fn aggregate_monthly(records: &[PlanRecord]) -> Vec<PlanRecord> {
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    let mut out: Vec<PlanRecord> = Vec::new();

    for rec in records {
        let month = month_key(&rec.date);
        let slot = *index.entry((rec.sku.as_str(), month)).or_insert_with(|| {
            out.push(PlanRecord {
                baseline_p50: Some(0.0),
                plan: Some(0.0),
                constrained_plan: Some(0.0),
                upside: Some(0.0),
                ..PlanRecord::new(rec.sku.as_str(), month)
            });
            out.len() - 1
        });

        let acc = &mut out[slot];
        add(&mut acc.baseline_p50, rec.baseline_p50);
        add(&mut acc.plan, rec.plan);
        add(&mut acc.constrained_plan, rec.constrained_plan);
        add(&mut acc.upside, rec.upside);
    }

    out
}

fn add(acc: &mut Option<f64>, value: Option<f64>) {
    let value = value.filter(|v| !v.is_nan()).unwrap_or(0.0);
    *acc = Some(acc.unwrap_or(0.0) + value);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
