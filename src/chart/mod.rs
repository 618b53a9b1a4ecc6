//! Chart documents for the dashboard.
//!
//! Builds [`ChartConfig`] documents from labelled series, applying
//! [`decimate`] to long line series before the points reach the renderer.

pub mod config;
pub mod decimate;

use serde_json::{Value, json};

pub use config::{ChartConfig, ChartConfigError, ChartData, ChartKind, DataPoint, Dataset};
pub use decimate::{DEFAULT_THRESHOLD, decimate, decimate_with_threshold};

/// Accent used for dashboard series.
const SERIES_COLOR: &str = "#3b82f6";
const SERIES_FILL: &str = "rgba(59, 130, 246, 0.5)";
const AXIS_COLOR: &str = "#94a3b8";
const GRID_COLOR: &str = "#334155";

/// A single labelled series and how to present it.
#[derive(Debug, Clone)]
pub struct SeriesChart {
    pub kind: ChartKind,
    /// Dataset legend label.
    pub label: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub x_title: String,
    pub y_title: String,
}

impl SeriesChart {
    pub fn new(kind: ChartKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            labels: Vec::new(),
            values: Vec::new(),
            x_title: "Date".to_string(),
            y_title: "Value".to_string(),
        }
    }

    pub fn points(mut self, labels: Vec<String>, values: Vec<f64>) -> Self {
        self.labels = labels;
        self.values = values;
        self
    }

    pub fn axes(mut self, x_title: impl Into<String>, y_title: impl Into<String>) -> Self {
        self.x_title = x_title.into();
        self.y_title = y_title.into();
        self
    }

    /// Build the chart document, reducing long line series to their key
    /// points when they exceed `threshold`.
    pub fn build(&self, threshold: usize) -> ChartConfig {
        let (labels, values) =
            decimate_with_threshold(&self.labels, &self.values, self.kind, threshold);

        let mut style = serde_json::Map::new();
        style.insert("borderColor".into(), Value::from(SERIES_COLOR));
        style.insert("backgroundColor".into(), Value::from(SERIES_FILL));
        if self.kind == ChartKind::Line {
            style.insert("tension".into(), Value::from(0.4));
            style.insert("pointRadius".into(), Value::from(6));
            style.insert("pointHoverRadius".into(), Value::from(8));
        }

        ChartConfig {
            kind: self.kind,
            data: ChartData {
                labels: labels.into_iter().map(Value::String).collect(),
                datasets: vec![Dataset {
                    label: self.label.clone(),
                    data: values.into_iter().map(DataPoint::value).collect(),
                    style,
                }],
            },
            options: axis_options(&self.x_title, &self.y_title),
        }
    }
}

fn axis_options(x_title: &str, y_title: &str) -> Value {
    let axis = |title: &str| {
        json!({
            "display": true,
            "title": { "display": true, "text": title, "color": AXIS_COLOR },
            "ticks": { "color": AXIS_COLOR },
            "grid": { "color": GRID_COLOR }
        })
    };

    json!({
        "responsive": true,
        "maintainAspectRatio": false,
        "plugins": {
            "legend": { "display": true, "labels": { "color": AXIS_COLOR } },
            "tooltip": { "enabled": true, "mode": "index", "intersect": false }
        },
        "scales": { "x": axis(x_title), "y": axis(y_title) }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn weekly_labels(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("W{i:02}")).collect()
    }

    #[test]
    fn long_line_chart_is_decimated() {
        let values: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let cfg = SeriesChart::new(ChartKind::Line, "Sales")
            .points(weekly_labels(30), values)
            .axes("Week", "Sales Qty")
            .build(DEFAULT_THRESHOLD);

        assert_eq!(cfg.kind, ChartKind::Line);
        assert!(cfg.point_count() <= 3);
        assert_eq!(cfg.data.labels.first(), Some(&Value::from("W00")));
        assert_eq!(cfg.data.labels.last(), Some(&Value::from("W29")));
        assert_eq!(cfg.data.datasets[0].style["tension"], 0.4);
    }

    #[test]
    fn bar_chart_keeps_every_point() {
        let values: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let cfg = SeriesChart::new(ChartKind::Bar, "Volume")
            .points(weekly_labels(30), values)
            .build(DEFAULT_THRESHOLD);
        assert_eq!(cfg.point_count(), 30);
        assert!(!cfg.data.datasets[0].style.contains_key("tension"));
    }

    #[test]
    fn axis_titles_are_set() {
        let cfg = SeriesChart::new(ChartKind::Line, "Forecast")
            .axes("Week", "Forecast Qty")
            .build(DEFAULT_THRESHOLD);
        assert_eq!(cfg.options["scales"]["x"]["title"]["text"], "Week");
        assert_eq!(cfg.options["scales"]["y"]["title"]["text"], "Forecast Qty");
    }

    #[test]
    fn built_config_parses_back() {
        let cfg = SeriesChart::new(ChartKind::Line, "Sales")
            .points(vec!["a".into()], vec![1.0])
            .build(DEFAULT_THRESHOLD);
        let json = serde_json::to_string(&cfg).unwrap();
        assert_eq!(ChartConfig::parse(&json).unwrap(), cfg);
    }
}
