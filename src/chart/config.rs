//! Typed chart configuration documents.
//!
//! The agent decides the chart shape, so its payload is validated here
//! before it reaches the browser: the `type` tag must name a known chart
//! kind and `data.datasets` must be present. Everything under `options` and
//! any extra dataset styling is passed through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Chart kinds understood by the frontend renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartKind {
    Line,
    Bar,
    Pie,
    Doughnut,
    Radar,
    PolarArea,
    Scatter,
    Bubble,
}

impl ChartKind {
    pub const ALL: [ChartKind; 8] = [
        Self::Line,
        Self::Bar,
        Self::Pie,
        Self::Doughnut,
        Self::Radar,
        Self::PolarArea,
        Self::Scatter,
        Self::Bubble,
    ];

    /// Tag used in the `type` field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Bar => "bar",
            Self::Pie => "pie",
            Self::Doughnut => "doughnut",
            Self::Radar => "radar",
            Self::PolarArea => "polarArea",
            Self::Scatter => "scatter",
            Self::Bubble => "bubble",
        }
    }

    /// Parse a `type` tag. Matching is case-insensitive.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(tag.trim()))
    }
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a chart payload was rejected.
#[derive(Debug, Error)]
pub enum ChartConfigError {
    #[error("chart payload is empty")]
    Empty,
    #[error("chart payload contains no JSON object")]
    NoJsonObject,
    #[error("chart payload has no \"type\" field")]
    MissingKind,
    #[error("unsupported chart type \"{0}\"")]
    UnknownKind(String),
    #[error("malformed chart payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A complete chart document: kind tag, data, and renderer options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub data: ChartData,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub options: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    /// Category labels; strings or numbers depending on the chart.
    #[serde(default)]
    pub labels: Vec<Value>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub label: String,
    pub data: Vec<DataPoint>,
    /// Colors, tension, point radius and any other renderer styling.
    #[serde(flatten)]
    pub style: Map<String, Value>,
}

/// A single dataset entry: a bare value (possibly a gap) or an x/y(/r) point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataPoint {
    Value(Option<f64>),
    Point {
        x: Value,
        y: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        r: Option<f64>,
    },
}

impl DataPoint {
    /// A bare value; non-finite numbers become gaps.
    pub fn value(v: f64) -> Self {
        Self::Value(v.is_finite().then_some(v))
    }
}

impl ChartConfig {
    /// Parse a textual payload.
    ///
    /// Tolerates prose or code fences around the document by taking the
    /// span from the first `{` to the last `}`.
    pub fn parse(payload: &str) -> Result<Self, ChartConfigError> {
        if payload.trim().is_empty() {
            return Err(ChartConfigError::Empty);
        }
        let json = extract_json_object(payload).ok_or(ChartConfigError::NoJsonObject)?;
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Validate an already-decoded payload.
    ///
    /// A JSON string holding an encoded document is unwrapped and parsed.
    pub fn from_value(value: Value) -> Result<Self, ChartConfigError> {
        let object = match value {
            Value::String(text) => return Self::parse(&text),
            Value::Null => return Err(ChartConfigError::Empty),
            Value::Object(map) => map,
            _ => return Err(ChartConfigError::NoJsonObject),
        };

        let kind = match object.get("type") {
            None | Some(Value::Null) => return Err(ChartConfigError::MissingKind),
            Some(Value::String(tag)) => {
                ChartKind::from_tag(tag).ok_or_else(|| ChartConfigError::UnknownKind(tag.clone()))?
            }
            Some(other) => return Err(ChartConfigError::UnknownKind(other.to_string())),
        };

        let mut object = object;
        // Normalize the tag so case variants deserialize.
        object.insert("type".to_string(), Value::String(kind.as_str().to_string()));

        Ok(serde_json::from_value(Value::Object(object))?)
    }

    /// Total number of data points across all datasets.
    pub fn point_count(&self) -> usize {
        self.data.datasets.iter().map(|d| d.data.len()).sum()
    }

    pub fn title(&self) -> Option<&str> {
        self.options
            .pointer("/plugins/title/text")
            .and_then(Value::as_str)
    }
}

/// Slice from the first `{` to the last `}` inclusive.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const LINE_CONFIG: &str = r##"{
        "type": "line",
        "data": {
            "labels": ["2024-01-01", "2024-01-08"],
            "datasets": [{ "label": "Sales", "data": [10, null], "borderColor": "#3b82f6" }]
        },
        "options": { "plugins": { "title": { "display": true, "text": "Sales" } } }
    }"##;

    #[test]
    fn parses_plain_document() {
        let cfg = ChartConfig::parse(LINE_CONFIG).unwrap();
        assert_eq!(cfg.kind, ChartKind::Line);
        assert_eq!(cfg.data.labels.len(), 2);
        assert_eq!(cfg.data.datasets[0].label, "Sales");
        assert_eq!(
            cfg.data.datasets[0].data,
            vec![DataPoint::Value(Some(10.0)), DataPoint::Value(None)]
        );
        assert_eq!(cfg.data.datasets[0].style["borderColor"], "#3b82f6");
        assert_eq!(cfg.title(), Some("Sales"));
        assert_eq!(cfg.point_count(), 2);
    }

    #[test]
    fn parses_document_wrapped_in_prose() {
        let payload = format!("Here is your chart:\n```json\n{LINE_CONFIG}\n```");
        let cfg = ChartConfig::parse(&payload).unwrap();
        assert_eq!(cfg.kind, ChartKind::Line);
    }

    #[test]
    fn unwraps_json_encoded_string() {
        let value = Value::String(LINE_CONFIG.to_string());
        let cfg = ChartConfig::from_value(value).unwrap();
        assert_eq!(cfg.kind, ChartKind::Line);
    }

    #[test]
    fn accepts_case_variant_tags() {
        let value = serde_json::json!({
            "type": "PolarArea",
            "data": { "datasets": [] }
        });
        let cfg = ChartConfig::from_value(value).unwrap();
        assert_eq!(cfg.kind, ChartKind::PolarArea);
        assert!(cfg.data.labels.is_empty());
    }

    #[test]
    fn parses_scatter_points() {
        let value = serde_json::json!({
            "type": "scatter",
            "data": { "datasets": [{ "label": "p", "data": [{ "x": 1, "y": 2.5 }] }] }
        });
        let cfg = ChartConfig::from_value(value).unwrap();
        assert!(matches!(
            cfg.data.datasets[0].data[0],
            DataPoint::Point { y: Some(y), r: None, .. } if y == 2.5
        ));
    }

    #[test]
    fn empty_payload_is_rejected() {
        assert!(matches!(ChartConfig::parse("  "), Err(ChartConfigError::Empty)));
        assert!(matches!(
            ChartConfig::from_value(Value::Null),
            Err(ChartConfigError::Empty)
        ));
    }

    #[test]
    fn prose_without_object_is_rejected() {
        assert!(matches!(
            ChartConfig::parse("I could not build a chart for that."),
            Err(ChartConfigError::NoJsonObject)
        ));
        assert!(matches!(
            ChartConfig::from_value(serde_json::json!([1, 2])),
            Err(ChartConfigError::NoJsonObject)
        ));
    }

    #[test]
    fn missing_type_is_rejected() {
        let err = ChartConfig::parse(r#"{"data": {"datasets": []}}"#).unwrap_err();
        assert!(matches!(err, ChartConfigError::MissingKind));
    }

    #[test]
    fn unknown_type_is_rejected_with_name() {
        let err = ChartConfig::parse(r#"{"type": "sankey", "data": {"datasets": []}}"#).unwrap_err();
        match err {
            ChartConfigError::UnknownKind(kind) => assert_eq!(kind, "sankey"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_datasets_is_malformed() {
        let err = ChartConfig::parse(r#"{"type": "bar", "data": {}}"#).unwrap_err();
        assert!(matches!(err, ChartConfigError::Malformed(_)));
    }

    #[test]
    fn non_finite_values_serialize_as_null() {
        let cfg = ChartConfig {
            kind: ChartKind::Bar,
            data: ChartData {
                labels: vec![Value::from("a")],
                datasets: vec![Dataset {
                    label: "x".into(),
                    data: vec![DataPoint::value(f64::NAN), DataPoint::value(3.0)],
                    style: Map::new(),
                }],
            },
            options: Value::Null,
        };
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(json.contains("\"data\":[null,3.0]"));
        assert!(json.contains("\"type\":\"bar\""));
        assert!(!json.contains("options"));
    }

    #[test]
    fn kind_tags_round_trip() {
        for kind in ChartKind::ALL {
            assert_eq!(ChartKind::from_tag(kind.as_str()), Some(kind));
        }
        assert_eq!(ChartKind::from_tag("pie "), Some(ChartKind::Pie));
        assert_eq!(ChartKind::from_tag("area"), None);
    }
}
