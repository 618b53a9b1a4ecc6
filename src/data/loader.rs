//! CSV loading and writing for plan and sales files.
//!
//! Expected plan columns: `SKU, Date, Baseline_P50, Plan, Constrained_Plan,
//! Upside` (extra columns are ignored). Expected sales columns:
//! `Date, SKU, Sales`, optionally followed by `Promo_Flag, Marketing_Spend`.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{PlanRecord, SalesRecord};

/// Deserialize every row of a headed CSV stream.
fn read_rows<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (line_num, result) in csv_reader.deserialize().enumerate() {
        // +2: one for the header, one for 1-based line numbers
        let row: T = result.with_context(|| format!("CSV parse error at line {}", line_num + 2))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Load plan records from any CSV reader.
pub fn load_plan<R: Read>(reader: R) -> Result<Vec<PlanRecord>> {
    read_rows(reader)
}

/// Load sales records from any CSV reader.
pub fn load_sales<R: Read>(reader: R) -> Result<Vec<SalesRecord>> {
    read_rows(reader)
}

/// Load plan records from a file path.
pub fn load_plan_file(path: &Path) -> Result<Vec<PlanRecord>> {
    let file =
        File::open(path).with_context(|| format!("failed to open plan file {}", path.display()))?;
    load_plan(file).with_context(|| format!("failed to read plan file {}", path.display()))
}

/// Load sales records from a file path.
pub fn load_sales_file(path: &Path) -> Result<Vec<SalesRecord>> {
    let file =
        File::open(path).with_context(|| format!("failed to open sales file {}", path.display()))?;
    load_sales(file).with_context(|| format!("failed to read sales file {}", path.display()))
}

/// Serialize rows as a headed CSV stream.
pub fn write_rows<T: Serialize, W: Write>(writer: W, rows: &[T]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row).context("failed to serialize CSV row")?;
    }
    csv_writer.flush().context("failed to flush CSV output")?;
    Ok(())
}

/// Write rows to `path`, creating parent directories as needed.
pub fn write_rows_file<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    write_rows(file, rows)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
