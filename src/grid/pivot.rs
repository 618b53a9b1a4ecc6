//! SKU × Date pivot of plan records.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::data::{Metric, PlanRecord};

/// Metric rows emitted for every SKU, in display order.
pub const PIVOT_METRICS: [Metric; 3] = [Metric::Baseline, Metric::ConstrainedPlan, Metric::Upside];

/// Placeholder for a cell with no record or no value.
pub const MISSING: &str = "-";

/// A rendered table cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    /// Rounded to a whole number.
    Value(f64),
    /// No matching record, or the metric was empty or not finite. Distinct
    /// from zero.
    Missing,
}

impl Cell {
    fn from_metric(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => Self::Value(round_half_away(v)),
            _ => Self::Missing,
        }
    }

    pub fn as_value(self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(v),
            Self::Missing => None,
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v:.0}"),
            Self::Missing => f.write_str(MISSING),
        }
    }
}

/// Round to 0 decimals, halves away from zero, no negative zero.
fn round_half_away(v: f64) -> f64 {
    let r = v.round();
    if r == 0.0 { 0.0 } else { r }
}

/// One (SKU, metric) row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotRow {
    pub sku: String,
    pub metric: &'static str,
    pub cells: Vec<Cell>,
}

/// Rendered grid: one column per date, three rows per SKU.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotTable {
    pub dates: Vec<String>,
    pub skus: Vec<String>,
    pub rows: Vec<PivotRow>,
}

impl PivotTable {
    /// Rows belonging to one SKU.
    pub fn rows_for<'a>(&'a self, sku: &'a str) -> impl Iterator<Item = &'a PivotRow> + 'a {
        self.rows.iter().filter(move |r| r.sku == sku)
    }

    /// Cell at (SKU, metric label, date), if the row and column exist.
    pub fn cell(&self, sku: &str, metric: Metric, date: &str) -> Option<Cell> {
        let col = self.dates.iter().position(|d| d == date)?;
        self.rows
            .iter()
            .find(|r| r.sku == sku && r.metric == metric.label())
            .map(|r| r.cells[col])
    }
}

/// Outcome of a pivot: a table, or an explicit "no data" state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PivotView {
    NoData { message: &'static str },
    Table(PivotTable),
}

impl PivotView {
    pub const NO_DATA_MESSAGE: &'static str = "No data available";

    pub fn table(&self) -> Option<&PivotTable> {
        match self {
            Self::Table(t) => Some(t),
            Self::NoData { .. } => None,
        }
    }
}

/// Intermediate lookup: SKU → Date → record, plus the sorted column axis.
///
/// `BTreeMap`/`BTreeSet` give the ascending string order both axes need;
/// ISO dates are zero-padded so string order is chronological.
#[derive(Debug)]
struct PivotGrid<'a> {
    by_sku: BTreeMap<&'a str, BTreeMap<&'a str, &'a PlanRecord>>,
    dates: BTreeSet<&'a str>,
}

impl<'a> PivotGrid<'a> {
    fn build(records: &'a [PlanRecord]) -> Self {
        let mut by_sku: BTreeMap<&str, BTreeMap<&str, &PlanRecord>> = BTreeMap::new();
        let mut dates = BTreeSet::new();
        for rec in records {
            dates.insert(rec.date.as_str());
            // Later records for the same (SKU, Date) replace earlier ones.
            by_sku
                .entry(rec.sku.as_str())
                .or_default()
                .insert(rec.date.as_str(), rec);
        }
        Self { by_sku, dates }
    }
}

/// Build the pivot view of `records`.
pub fn build_pivot(records: &[PlanRecord]) -> PivotView {
    if records.is_empty() {
        return PivotView::NoData {
            message: PivotView::NO_DATA_MESSAGE,
        };
    }

    let grid = PivotGrid::build(records);
    let dates: Vec<String> = grid.dates.iter().map(|d| d.to_string()).collect();

    let mut rows = Vec::with_capacity(grid.by_sku.len() * PIVOT_METRICS.len());
    for (sku, by_date) in &grid.by_sku {
        for metric in PIVOT_METRICS {
            let cells = grid
                .dates
                .iter()
                .map(|date| Cell::from_metric(by_date.get(date).and_then(|r| r.metric(metric))))
                .collect();
            rows.push(PivotRow {
                sku: sku.to_string(),
                metric: metric.label(),
                cells,
            });
        }
    }

    PivotView::Table(PivotTable {
        dates,
        skus: grid.by_sku.keys().map(|s| s.to_string()).collect(),
        rows,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(sku: &str, date: &str, baseline: Option<f64>, constrained: Option<f64>) -> PlanRecord {
        PlanRecord {
            baseline_p50: baseline,
            constrained_plan: constrained,
            ..PlanRecord::new(sku, date)
        }
    }

    #[test]
    fn empty_input_is_no_data() {
        let view = build_pivot(&[]);
        assert_eq!(
            view,
            PivotView::NoData {
                message: "No data available"
            }
        );
        assert!(view.table().is_none());
    }

    #[test]
    fn axes_are_sorted_and_deduplicated() {
        let records = vec![
            rec("SKU_B", "2024-01-14", Some(1.0), None),
            rec("SKU_A", "2024-01-07", Some(2.0), None),
            rec("SKU_B", "2024-01-07", Some(3.0), None),
        ];
        let view = build_pivot(&records);
        let table = view.table().unwrap();
        assert_eq!(table.dates, vec!["2024-01-07", "2024-01-14"]);
        assert_eq!(table.skus, vec!["SKU_A", "SKU_B"]);
        assert_eq!(table.rows.len(), 6);
    }

    #[test]
    fn metric_rows_follow_fixed_order() {
        let records = vec![rec("A", "2024-01-07", Some(1.0), Some(2.0))];
        let table = build_pivot(&records).table().unwrap().clone();
        let labels: Vec<&str> = table.rows_for("A").map(|r| r.metric).collect();
        assert_eq!(labels, vec!["Baseline", "Constrained Plan", "Upside"]);
    }

    #[test]
    fn cells_round_and_mark_missing() {
        let records = vec![
            rec("A", "2024-01-07", Some(10.5), Some(0.0)),
            rec("A", "2024-01-14", None, Some(-0.4)),
            rec("B", "2024-01-21", Some(2.49), None),
        ];
        let view = build_pivot(&records);
        let t = view.table().unwrap();
        assert_eq!(t.cell("A", Metric::Baseline, "2024-01-07"), Some(Cell::Value(11.0)));
        assert_eq!(t.cell("A", Metric::ConstrainedPlan, "2024-01-07"), Some(Cell::Value(0.0)));
        assert_eq!(t.cell("A", Metric::Baseline, "2024-01-14"), Some(Cell::Missing));
        assert_eq!(t.cell("A", Metric::ConstrainedPlan, "2024-01-14"), Some(Cell::Value(0.0)));
        // A has no record for B's date
        assert_eq!(t.cell("A", Metric::Baseline, "2024-01-21"), Some(Cell::Missing));
        assert_eq!(t.cell("B", Metric::Baseline, "2024-01-21"), Some(Cell::Value(2.0)));
    }

    #[test]
    fn missing_and_zero_render_differently() {
        assert_eq!(Cell::Missing.to_string(), "-");
        assert_eq!(Cell::Value(0.0).to_string(), "0");
        assert_eq!(Cell::from_metric(Some(-0.2)).to_string(), "0");
        assert_eq!(Cell::from_metric(Some(1234.5)).to_string(), "1235");
        assert_eq!(Cell::from_metric(Some(f64::NAN)), Cell::Missing);
    }

    #[test]
    fn infinite_metrics_are_missing() {
        let records = crate::data::loader::load_plan(
            "SKU,Date,Baseline_P50,Plan,Constrained_Plan,Upside\nA,2024-01-07,inf,1,-inf,2\n"
                .as_bytes(),
        )
        .unwrap();
        assert_eq!(records[0].baseline_p50, Some(f64::INFINITY));

        let view = build_pivot(&records);
        let t = view.table().unwrap();
        assert_eq!(t.cell("A", Metric::Baseline, "2024-01-07"), Some(Cell::Missing));
        assert_eq!(t.cell("A", Metric::ConstrainedPlan, "2024-01-07"), Some(Cell::Missing));
        assert_eq!(t.cell("A", Metric::Upside, "2024-01-07"), Some(Cell::Value(2.0)));
        assert_eq!(t.cell("A", Metric::Baseline, "2024-01-07").unwrap().to_string(), "-");
    }

    #[test]
    fn duplicate_keys_last_write_wins() {
        let records = vec![
            rec("A", "2024-01-07", Some(5.0), None),
            rec("A", "2024-01-07", Some(9.0), None),
        ];
        let view = build_pivot(&records);
        let t = view.table().unwrap();
        assert_eq!(t.dates.len(), 1);
        assert_eq!(t.cell("A", Metric::Baseline, "2024-01-07"), Some(Cell::Value(9.0)));
    }

    #[test]
    fn serializes_cells_as_numbers_or_null() {
        let records = vec![rec("A", "2024-01-07", Some(3.0), None)];
        let json = serde_json::to_value(build_pivot(&records)).unwrap();
        assert_eq!(json["status"], "table");
        assert_eq!(json["rows"][0]["cells"][0], 3.0);
        assert!(json["rows"][1]["cells"][0].is_null());

        let empty = serde_json::to_value(build_pivot(&[])).unwrap();
        assert_eq!(empty["status"], "no_data");
        assert_eq!(empty["message"], "No data available");
    }
}
