/// Chart integration tests.
///
/// Cover decimation properties over varied series and the validation of
/// chart payloads as they arrive from the agent.
use demandboard::chart::{
    ChartConfig, ChartConfigError, ChartKind, DEFAULT_THRESHOLD, DataPoint, SeriesChart, decimate,
};

/// Deterministic wavy series with a spike and a dip.
fn wavy(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let base = 500.0 + ((i * 37) % 11) as f64 * 10.0;
            match i {
                7 => base + 900.0,
                19 => base - 450.0,
                _ => base,
            }
        })
        .collect()
}

fn labels(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("2024-W{i:02}")).collect()
}

// ---------------------------------------------------------------------------
// Decimation
// ---------------------------------------------------------------------------

#[test]
fn decimated_points_are_an_ordered_subsequence() {
    for n in [21, 24, 52, 104] {
        let values = wavy(n);
        let labels = labels(n);
        let (out_labels, out_values) = decimate(&labels, &values, ChartKind::Line);

        assert!(!out_values.is_empty() && out_values.len() <= 3, "n={n}");
        assert_eq!(out_labels.len(), out_values.len());

        let positions: Vec<usize> = out_labels
            .iter()
            .map(|l| labels.iter().position(|x| x == l).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "n={n}");
        for (pos, v) in positions.iter().zip(&out_values) {
            assert_eq!(values[*pos], *v);
        }
    }
}

#[test]
fn decimation_keeps_extremes() {
    let values = wavy(30);
    let (_, out) = decimate(&labels(30), &values, ChartKind::Line);
    let max = values.iter().cloned().fold(f64::MIN, f64::max);
    let min = values.iter().cloned().fold(f64::MAX, f64::min);
    assert!(out.contains(&max));
    assert!(out.contains(&min));
}

#[test]
fn short_or_non_line_series_pass_through() {
    let values = wavy(DEFAULT_THRESHOLD);
    let (_, out) = decimate(&labels(DEFAULT_THRESHOLD), &values, ChartKind::Line);
    assert_eq!(out, values);

    let values = wavy(60);
    for kind in [ChartKind::Bar, ChartKind::Pie, ChartKind::Scatter] {
        let (_, out) = decimate(&labels(60), &values, kind);
        assert_eq!(out, values, "{kind}");
    }
}

#[test]
fn series_chart_applies_threshold_from_caller() {
    let chart = SeriesChart::new(ChartKind::Line, "Forecast")
        .points(labels(10), wavy(10))
        .axes("Week", "Qty");

    assert_eq!(chart.build(20).point_count(), 10);
    assert!(chart.build(5).point_count() <= 3);

    let config = chart.build(20);
    assert_eq!(config.data.labels.len(), 10);
    assert_eq!(config.data.datasets[0].label, "Forecast");
}

// ---------------------------------------------------------------------------
// Payload validation
// ---------------------------------------------------------------------------

#[test]
fn parses_payload_wrapped_in_prose() {
    let payload = r##"Here is your chart:
```json
{"type": "Bar", "data": {"labels": ["SKU_001", "SKU_002"],
 "datasets": [{"label": "Plan", "data": [120, 95.5], "backgroundColor": "#f00"}]},
 "options": {"plugins": {"title": {"display": true, "text": "Plan by SKU"}}}}
```
Let me know if you need anything else."##;

    let chart = ChartConfig::parse(payload).unwrap();
    assert_eq!(chart.kind, ChartKind::Bar);
    assert_eq!(chart.title(), Some("Plan by SKU"));
    assert_eq!(chart.point_count(), 2);
    assert_eq!(
        chart.data.datasets[0].style.get("backgroundColor"),
        Some(&serde_json::json!("#f00"))
    );
}

#[test]
fn accepts_string_encoded_payload() {
    let value = serde_json::json!(
        "{\"type\": \"line\", \"data\": {\"labels\": [1, 2], \"datasets\": [{\"data\": [1, null]}]}}"
    );
    let chart = ChartConfig::from_value(value).unwrap();
    assert_eq!(chart.kind, ChartKind::Line);
    assert_eq!(chart.data.datasets[0].data[1], DataPoint::Value(None));
}

#[test]
fn accepts_point_datasets() {
    let chart = ChartConfig::parse(
        r#"{"type": "scatter", "data": {"datasets": [{"label": "p", "data": [{"x": 1, "y": 2}]}]}}"#,
    )
    .unwrap();
    assert_eq!(chart.kind, ChartKind::Scatter);
    assert!(matches!(
        chart.data.datasets[0].data[0],
        DataPoint::Point { y: Some(y), .. } if y == 2.0
    ));
}

#[test]
fn rejects_invalid_payloads() {
    assert!(matches!(ChartConfig::parse("   "), Err(ChartConfigError::Empty)));
    assert!(matches!(
        ChartConfig::parse("no chart here"),
        Err(ChartConfigError::NoJsonObject)
    ));
    assert!(matches!(
        ChartConfig::parse(r#"{"data": {"datasets": []}}"#),
        Err(ChartConfigError::MissingKind)
    ));
    assert!(matches!(
        ChartConfig::parse(r#"{"type": "sankey", "data": {"datasets": []}}"#),
        Err(ChartConfigError::UnknownKind(k)) if k == "sankey"
    ));
    assert!(matches!(
        ChartConfig::parse(r#"{"type": "line", "data": {"datasets": [{"data": ["a"]}]}}"#),
        Err(ChartConfigError::Malformed(_))
    ));
}

#[test]
fn validated_config_serializes_with_type_tag() {
    let chart = ChartConfig::parse(r#"{"type": "PIE", "data": {"datasets": [{"data": [1]}]}}"#)
        .unwrap();
    let json = serde_json::to_value(&chart).unwrap();
    assert_eq!(json["type"], "pie");
    assert!(json.get("options").is_none());
}
