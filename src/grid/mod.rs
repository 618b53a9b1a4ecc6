//! Tabular view of the plan: SKU filter, time bucketing and pivoting.
//!
//! The pipeline is pure and rebuilt from a record snapshot on every call:
//!
//! ```text
//! records --filter_by_sku--> --aggregate(bucket)--> --build_pivot--> PivotView
//! ```

pub mod bucket;
pub mod filter;
pub mod pivot;

use serde::Deserialize;

use crate::data::PlanRecord;

pub use bucket::{Bucket, aggregate, month_key};
pub use filter::filter_by_sku;
pub use pivot::{Cell, PivotRow, PivotTable, PivotView, build_pivot};

/// User selections for the table view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TableQuery {
    /// Case-insensitive SKU substring; empty matches all.
    pub sku_filter: String,
    pub bucket: Bucket,
}

impl TableQuery {
    pub fn new(sku_filter: impl Into<String>, bucket: Bucket) -> Self {
        Self {
            sku_filter: sku_filter.into(),
            bucket,
        }
    }
}

/// Filter, bucket and pivot `records` for display.
pub fn render_table(records: &[PlanRecord], query: &TableQuery) -> PivotView {
    let filtered = filter_by_sku(records, &query.sku_filter);
    let bucketed = aggregate(&filtered, query.bucket);
    build_pivot(&bucketed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Metric;

    fn rec(sku: &str, date: &str, constrained: f64) -> PlanRecord {
        PlanRecord {
            constrained_plan: Some(constrained),
            ..PlanRecord::new(sku, date)
        }
    }

    #[test]
    fn filter_and_bucket_compose() {
        let records = vec![
            rec("SKU_001", "2024-01-07", 10.0),
            rec("SKU_001", "2024-01-14", 15.0),
            rec("OTHER", "2024-01-07", 99.0),
        ];
        let view = render_table(&records, &TableQuery::new("sku", Bucket::Monthly));
        let table = view.table().unwrap();
        assert_eq!(table.skus, vec!["SKU_001"]);
        assert_eq!(table.dates, vec!["2024-01"]);
        assert_eq!(
            table.cell("SKU_001", Metric::ConstrainedPlan, "2024-01"),
            Some(Cell::Value(25.0))
        );
        // Monthly sums are always defined, so Baseline shows 0 rather than "-".
        assert_eq!(
            table.cell("SKU_001", Metric::Baseline, "2024-01"),
            Some(Cell::Value(0.0))
        );
    }

    #[test]
    fn filter_with_no_match_is_no_data() {
        let records = vec![rec("SKU_001", "2024-01-07", 1.0)];
        let view = render_table(&records, &TableQuery::new("zzz", Bucket::Weekly));
        assert!(matches!(view, PivotView::NoData { .. }));
    }

    #[test]
    fn default_query_is_weekly_unfiltered() {
        let query = TableQuery::default();
        assert_eq!(query.bucket, Bucket::Weekly);
        assert!(query.sku_filter.is_empty());
    }
}
