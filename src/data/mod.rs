//! Demand-planning records and the application state snapshot.
//!
//! Records are read once from CSV (see [`loader`]) and never mutated in
//! place. Every derived view (pivot grid, monthly rollup, dashboard series)
//! is rebuilt from an [`AppState`] snapshot on each request.

pub mod generator;
pub mod loader;

use anyhow::Result;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::schema::DataConfig;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One row of the demand plan: a (SKU, Date) pair with its plan metrics.
///
/// Metric fields are `None` when the source cell is empty, null, or not a
/// number. `Date` is an ISO `YYYY-MM-DD` (weekly) or `YYYY-MM` (monthly) key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRecord {
    #[serde(rename = "SKU")]
    pub sku: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Baseline_P50", default, deserialize_with = "lenient_f64")]
    pub baseline_p50: Option<f64>,
    #[serde(rename = "Plan", default, deserialize_with = "lenient_f64")]
    pub plan: Option<f64>,
    #[serde(rename = "Constrained_Plan", default, deserialize_with = "lenient_f64")]
    pub constrained_plan: Option<f64>,
    #[serde(rename = "Upside", default, deserialize_with = "lenient_f64")]
    pub upside: Option<f64>,
}

impl PlanRecord {
    /// A record with every metric unset.
    pub fn new(sku: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            sku: sku.into(),
            date: date.into(),
            baseline_p50: None,
            plan: None,
            constrained_plan: None,
            upside: None,
        }
    }

    /// Look up a metric by its column.
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Baseline => self.baseline_p50,
            Metric::Plan => self.plan,
            Metric::ConstrainedPlan => self.constrained_plan,
            Metric::Upside => self.upside,
        }
    }
}

/// One row of weekly sales history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "SKU")]
    pub sku: String,
    #[serde(rename = "Sales", default, deserialize_with = "lenient_f64")]
    pub sales: Option<f64>,
    /// Promotion running that week. Written as `0`/`1`.
    #[serde(
        rename = "Promo_Flag",
        default,
        deserialize_with = "lenient_flag",
        serialize_with = "flag_as_digit"
    )]
    pub promo_flag: bool,
    #[serde(rename = "Marketing_Spend", default, deserialize_with = "lenient_f64")]
    pub marketing_spend: Option<f64>,
}

impl SalesRecord {
    /// A week with no signal columns.
    pub fn new(date: impl Into<String>, sku: impl Into<String>, sales: Option<f64>) -> Self {
        Self {
            date: date.into(),
            sku: sku.into(),
            sales,
            promo_flag: false,
            marketing_spend: None,
        }
    }
}

/// Numeric plan columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Metric {
    #[serde(rename = "Baseline_P50")]
    Baseline,
    #[serde(rename = "Plan")]
    Plan,
    #[serde(rename = "Constrained_Plan")]
    ConstrainedPlan,
    #[serde(rename = "Upside")]
    Upside,
}

impl Metric {
    /// Display label used in table rows.
    pub fn label(self) -> &'static str {
        match self {
            Self::Baseline => "Baseline",
            Self::Plan => "Plan",
            Self::ConstrainedPlan => "Constrained Plan",
            Self::Upside => "Upside",
        }
    }

    /// Source column name.
    pub fn column(self) -> &'static str {
        match self {
            Self::Baseline => "Baseline_P50",
            Self::Plan => "Plan",
            Self::ConstrainedPlan => "Constrained_Plan",
            Self::Upside => "Upside",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Lenient numeric fields
// ---------------------------------------------------------------------------

/// Accept numbers, numeric strings, empty strings and nulls.
///
/// Upstream exports fill missing cells with `""`, so a strict `Option<f64>`
/// would reject otherwise valid rows. Anything non-numeric becomes `None`.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct LenientVisitor;

    impl<'de> serde::de::Visitor<'de> for LenientVisitor {
        type Value = Option<f64>;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("a number, a numeric string, or null")
        }

        fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_bool<E: serde::de::Error>(self, _v: bool) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(v.trim().parse::<f64>().ok())
        }

        fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D2: Deserializer<'de>>(self, d: D2) -> Result<Self::Value, D2::Error> {
            d.deserialize_any(LenientVisitor)
        }
    }

    deserializer.deserialize_any(LenientVisitor)
}

/// Any non-zero number is set; blanks and text are unset.
fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_f64(deserializer)?.is_some_and(|v| v != 0.0))
}

fn flag_as_digit<S: Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*flag))
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Immutable snapshot of everything the dashboard renders from.
///
/// Owned by the server loop and passed to handlers by reference. A planning
/// run replaces the whole snapshot rather than patching it.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub plan: Vec<PlanRecord>,
    pub sales: Vec<SalesRecord>,
}

impl AppState {
    /// Load plan and sales files named in the config.
    ///
    /// A missing file yields an empty list with a warning on stderr so the
    /// dashboard can still start and show its "no data" state.
    pub fn load(config: &DataConfig) -> Result<Self> {
        let plan = if config.plan_path.exists() {
            loader::load_plan_file(&config.plan_path)?
        } else {
            eprintln!(
                "warning: plan file not found at {} (run `demandboard generate`)",
                config.plan_path.display()
            );
            Vec::new()
        };

        let sales = if config.sales_path.exists() {
            loader::load_sales_file(&config.sales_path)?
        } else {
            eprintln!(
                "warning: sales file not found at {}",
                config.sales_path.display()
            );
            Vec::new()
        };

        Ok(Self { plan, sales })
    }

    pub fn is_empty(&self) -> bool {
        self.plan.is_empty() && self.sales.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_record_deserializes_json_with_blanks() {
        let json = r#"{
            "SKU": "SKU_001",
            "Date": "2024-01-07",
            "Baseline_P50": 12.5,
            "Plan": "",
            "Constrained_Plan": "30",
            "Upside": null
        }"#;
        let rec: PlanRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.sku, "SKU_001");
        assert_eq!(rec.baseline_p50, Some(12.5));
        assert_eq!(rec.plan, None);
        assert_eq!(rec.constrained_plan, Some(30.0));
        assert_eq!(rec.upside, None);
    }

    #[test]
    fn plan_record_missing_fields_default_to_none() {
        let json = r#"{ "SKU": "A", "Date": "2024-01" }"#;
        let rec: PlanRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec, PlanRecord::new("A", "2024-01"));
    }

    #[test]
    fn non_numeric_metric_becomes_none() {
        let json = r#"{ "SKU": "A", "Date": "2024-01-07", "Upside": "n/a", "Plan": true }"#;
        let rec: PlanRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.upside, None);
        assert_eq!(rec.plan, None);
    }

    #[test]
    fn plan_record_serializes_with_source_column_names() {
        let mut rec = PlanRecord::new("A", "2024-01");
        rec.constrained_plan = Some(25.0);
        let json = serde_json::to_string(&rec).unwrap();
        assert!(json.contains("\"SKU\":\"A\""));
        assert!(json.contains("\"Constrained_Plan\":25.0"));
        assert!(json.contains("\"Upside\":null"));
    }

    #[test]
    fn metric_lookup_matches_fields() {
        let rec = PlanRecord {
            sku: "A".into(),
            date: "2024-01-07".into(),
            baseline_p50: Some(1.0),
            plan: Some(2.0),
            constrained_plan: Some(3.0),
            upside: Some(4.0),
        };
        assert_eq!(rec.metric(Metric::Baseline), Some(1.0));
        assert_eq!(rec.metric(Metric::Plan), Some(2.0));
        assert_eq!(rec.metric(Metric::ConstrainedPlan), Some(3.0));
        assert_eq!(rec.metric(Metric::Upside), Some(4.0));
        assert_eq!(Metric::ConstrainedPlan.label(), "Constrained Plan");
        assert_eq!(Metric::Baseline.column(), "Baseline_P50");
    }

    #[test]
    fn sales_signal_columns_are_optional() {
        let rec: SalesRecord =
            serde_json::from_str(r#"{ "Date": "2024-01-01", "SKU": "A", "Sales": 5 }"#).unwrap();
        assert_eq!(rec, SalesRecord::new("2024-01-01", "A", Some(5.0)));

        let rec: SalesRecord = serde_json::from_str(
            r#"{ "Date": "2024-01-01", "SKU": "A", "Sales": 5, "Promo_Flag": "1", "Marketing_Spend": 2400 }"#,
        )
        .unwrap();
        assert!(rec.promo_flag);
        assert_eq!(rec.marketing_spend, Some(2400.0));
        assert!(serde_json::to_string(&rec).unwrap().contains("\"Promo_Flag\":1"));
    }

    #[test]
    fn app_state_load_tolerates_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = DataConfig {
            plan_path: dir.path().join("missing_plan.csv"),
            sales_path: dir.path().join("missing_sales.csv"),
            ..DataConfig::default()
        };
        let state = AppState::load(&config).unwrap();
        assert!(state.is_empty());
    }
}
