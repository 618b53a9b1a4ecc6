//! Point reduction for long line series.
//!
//! A long horizon plotted point-by-point clutters a small chart. Instead of
//! every-Nth downsampling (which can hide the true extremes), a long series
//! is reduced to its first minimum, first maximum, and the point closest to
//! the mean, kept in their original left-to-right order.

use super::ChartKind;

/// Series at or below this length are never reduced.
pub const DEFAULT_THRESHOLD: usize = 20;

/// Reduce a series using [`DEFAULT_THRESHOLD`].
pub fn decimate<T: Clone>(labels: &[T], values: &[f64], kind: ChartKind) -> (Vec<T>, Vec<f64>) {
    decimate_with_threshold(labels, values, kind, DEFAULT_THRESHOLD)
}

/// Reduce a series of `labels`/`values` (index-aligned, equal length).
///
/// Only line charts longer than `threshold` are reduced; everything else is
/// returned unchanged. The output has 1–3 points for a non-empty reduced
/// series, and is empty for an empty input.
pub fn decimate_with_threshold<T: Clone>(
    labels: &[T],
    values: &[f64],
    kind: ChartKind,
    threshold: usize,
) -> (Vec<T>, Vec<f64>) {
    debug_assert_eq!(labels.len(), values.len(), "labels and values must align");

    if kind != ChartKind::Line || values.len() <= threshold {
        return (labels.to_vec(), values.to_vec());
    }

    let indices = key_indices(values);
    let labels = indices.iter().map(|&i| labels[i].clone()).collect();
    let values = indices.iter().map(|&i| values[i]).collect();
    (labels, values)
}

/// Indices of the first min, first max, and first closest-to-mean value,
/// de-duplicated and ascending.
pub fn key_indices(values: &[f64]) -> Vec<usize> {
    if values.is_empty() {
        return Vec::new();
    }

    let mut min_idx = 0;
    let mut max_idx = 0;
    for (i, &v) in values.iter().enumerate() {
        // Strict comparisons keep the first occurrence on ties.
        if v < values[min_idx] {
            min_idx = i;
        }
        if v > values[max_idx] {
            max_idx = i;
        }
    }

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let mut avg_idx = 0;
    let mut best = (values[0] - mean).abs();
    for (i, &v) in values.iter().enumerate().skip(1) {
        let dist = (v - mean).abs();
        if dist < best {
            best = dist;
            avg_idx = i;
        }
    }

    let mut indices = vec![min_idx, max_idx, avg_idx];
    indices.sort_unstable();
    indices.dedup();
    indices
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
