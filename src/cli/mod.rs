//! CLI command implementations for demandboard.
//!
//! Provides subcommand handlers for:
//! - `demandboard serve`: run the web dashboard
//! - `demandboard table --sku X --bucket monthly`: pivoted plan in the terminal
//! - `demandboard chart "query"`: ask the agent for a chart config
//! - `demandboard chat "message"`: ask the agent, or run planning
//! - `demandboard history`: replay logged interactions
//! - `demandboard generate`: write a synthetic sales history and plan
//! - `demandboard health`: check config, data files and agent
//! - `demandboard config show|init|set|reset`: configuration management

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;

use crate::agent::{AgentService, MessageRoute, route_message};
use crate::chart::ChartConfig;
use crate::config;
use crate::data::generator::{self, GeneratorParams};
use crate::data::{AppState, loader};
use crate::grid::{self, Bucket, Cell, PivotTable, PivotView, TableQuery};
use crate::history::Interaction;

/// Output format for data commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// demandboard serve
// ---------------------------------------------------------------------------

/// Run the web dashboard, optionally overriding the listen address.
pub fn run_serve(addr: Option<String>, no_browser: bool) -> Result<()> {
    let mut cfg = config::load();
    if let Some(addr) = addr {
        cfg.server.addr = addr;
    }
    if no_browser {
        cfg.server.open_browser = false;
    }
    crate::web::serve(cfg)
}

// ---------------------------------------------------------------------------
// demandboard table
// ---------------------------------------------------------------------------

/// Print the plan table for the given filter and bucket.
pub fn run_table(sku: &str, bucket: Bucket, format: OutputFormat) -> Result<()> {
    let cfg = config::load();
    let state = AppState::load(&cfg.data)?;
    let view = grid::render_table(&state.plan, &TableQuery::new(sku, bucket));

    match (&view, format) {
        (_, OutputFormat::Json) => println!("{}", serde_json::to_string_pretty(&view)?),
        (PivotView::NoData { message }, _) => println!("{}", message.yellow()),
        (PivotView::Table(table), OutputFormat::Csv) => print_table_csv(table)?,
        (PivotView::Table(table), OutputFormat::Table) => print_table(table, bucket),
    }

    Ok(())
}

const SKU_WIDTH: usize = 12;
const METRIC_WIDTH: usize = 16;
const CELL_WIDTH: usize = 10;

fn print_table(table: &PivotTable, bucket: Bucket) {
    println!(
        "{}",
        format!("Demand Plan ({bucket}, {} SKUs)", table.skus.len())
            .bold()
            .cyan()
    );

    let mut header = format!("  {:<SKU_WIDTH$} {:<METRIC_WIDTH$}", "SKU", "Metric");
    for date in &table.dates {
        header.push_str(&format!(" {date:>CELL_WIDTH$}"));
    }
    println!("{}", header.bold());
    println!(
        "  {}",
        "-".repeat(SKU_WIDTH + METRIC_WIDTH + 1 + table.dates.len() * (CELL_WIDTH + 1))
    );

    let mut last_sku: Option<&str> = None;
    for (i, row) in table.rows.iter().enumerate() {
        let sku = if last_sku == Some(row.sku.as_str()) {
            ""
        } else {
            row.sku.as_str()
        };
        last_sku = Some(row.sku.as_str());

        let mut line = format!(
            "  {:<SKU_WIDTH$} {:<METRIC_WIDTH$}",
            truncate(sku, SKU_WIDTH),
            row.metric
        );
        for cell in &row.cells {
            line.push_str(&format!(" {:>CELL_WIDTH$}", cell.to_string()));
        }

        // Alternate shading per SKU block.
        if (i / grid::pivot::PIVOT_METRICS.len()) % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
}

fn print_table_csv(table: &PivotTable) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(io::stdout());

    let mut header = vec!["SKU".to_string(), "Metric".to_string()];
    header.extend(table.dates.iter().cloned());
    wtr.write_record(&header)?;

    for row in &table.rows {
        let mut record = vec![row.sku.clone(), row.metric.to_string()];
        record.extend(row.cells.iter().map(|c| match c {
            Cell::Value(v) => format!("{v:.0}"),
            Cell::Missing => String::new(),
        }));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// demandboard chart
// ---------------------------------------------------------------------------

/// Ask the agent for a chart and print the validated config.
pub fn run_chart(query: &str, format: OutputFormat) -> Result<()> {
    let cfg = config::load();
    let agent = AgentService::from_config(&cfg);
    let chart = agent.chart(query).context("Error generating chart")?;

    match format {
        OutputFormat::Table => print_chart_summary(&chart),
        _ => println!("{}", serde_json::to_string_pretty(&chart)?),
    }

    Ok(())
}

fn print_chart_summary(chart: &ChartConfig) {
    println!("{}", "Chart".bold().cyan());
    println!("  {} {}", "Type:    ".bold(), chart.kind);
    if let Some(title) = chart.title() {
        println!("  {} {}", "Title:   ".bold(), title);
    }
    println!("  {} {}", "Labels:  ".bold(), chart.data.labels.len());
    for ds in &chart.data.datasets {
        println!(
            "  {} {} ({} points)",
            "Dataset: ".bold(),
            if ds.label.is_empty() { "(unnamed)" } else { ds.label.as_str() },
            ds.data.len()
        );
    }
    println!();
    println!(
        "  {}",
        "Use --format json for the full Chart.js config.".dimmed()
    );
}

// ---------------------------------------------------------------------------
// demandboard chat
// ---------------------------------------------------------------------------

/// Send a message to the agent. Planning phrases run the planning cycle.
pub fn run_chat(message: &str) -> Result<()> {
    let cfg = config::load();
    let agent = AgentService::from_config(&cfg);

    match route_message(message) {
        MessageRoute::Empty => {
            println!("{}", "Please enter a message.".yellow());
        }
        MessageRoute::Planning => {
            println!("{}", "Running planning cycle...".dimmed());
            let report = agent.run_planning(message.trim())?;
            for line in &report.logs {
                println!("  {} {}", "·".dimmed(), line);
            }
            println!(
                "{} Planning cycle finished: {}",
                "✓".green().bold(),
                report.status
            );
            if !report.report.is_empty() {
                println!();
                println!("{}", report.report);
            }
        }
        MessageRoute::Chat => {
            let answer = agent.chat(message)?;
            println!("{} {}", format!("{}:", answer.agent).green().bold(), answer.text);
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// demandboard history
// ---------------------------------------------------------------------------

/// Show the most recent logged interactions.
pub fn run_history(limit: usize, format: OutputFormat) -> Result<()> {
    let cfg = config::load();
    let agent = AgentService::from_config(&cfg);
    let entries = agent.history().tail(limit);

    if entries.is_empty() && format == OutputFormat::Table {
        println!("{}", "No interactions logged yet.".yellow());
        return Ok(());
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(io::stdout());
            for entry in &entries {
                wtr.serialize(entry)?;
            }
            wtr.flush()?;
        }
        OutputFormat::Table => print_history(&entries),
    }

    Ok(())
}

fn print_history(entries: &[Interaction]) {
    println!("{}", "Interaction History".bold().cyan());
    println!("{}", "=".repeat(60));
    for entry in entries {
        println!(
            "{} {}",
            entry.short_timestamp().dimmed(),
            entry.agent.green()
        );
        println!("  {} {}", "Q:".bold(), entry.user_query);
        println!("  {} {}", "A:".bold(), truncate(&entry.agent_response, 200));
        println!();
    }
}

// ---------------------------------------------------------------------------
// demandboard generate
// ---------------------------------------------------------------------------

/// Generate synthetic data and write both CSV files.
///
/// With `out_dir`, files are written there as `sales_data.csv` and
/// `final_plan.csv`; otherwise to the configured data paths.
pub fn run_generate(params: &GeneratorParams, out_dir: Option<&Path>) -> Result<()> {
    let cfg = config::load();
    let (sales_path, plan_path): (PathBuf, PathBuf) = match out_dir {
        Some(dir) => (dir.join("sales_data.csv"), dir.join("final_plan.csv")),
        None => (cfg.data.sales_path.clone(), cfg.data.plan_path.clone()),
    };

    let data = generator::generate(params)?;
    loader::write_rows_file(&sales_path, &data.sales)?;
    loader::write_rows_file(&plan_path, &data.plan)?;

    println!(
        "{} Wrote {} sales rows to {}",
        "✓".green().bold(),
        data.sales.len(),
        sales_path.display()
    );
    println!(
        "{} Wrote {} plan rows to {}",
        "✓".green().bold(),
        data.plan.len(),
        plan_path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// demandboard health
// ---------------------------------------------------------------------------

/// Check config files, data files, the agent and the history log.
pub fn run_health() -> Result<()> {
    println!("{}", "demandboard Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let cfg = config::load();

    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.demandboard/config.toml found"
        } else {
            "not found (run `demandboard config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            "demandboard.toml found"
        } else {
            "none (optional)"
        },
    );

    match AppState::load(&cfg.data) {
        Ok(state) => {
            print_health_item(
                "Plan data",
                !state.plan.is_empty(),
                &format!("{} rows in {}", state.plan.len(), cfg.data.plan_path.display()),
            );
            print_health_item(
                "Sales data",
                !state.sales.is_empty(),
                &format!(
                    "{} rows in {}",
                    state.sales.len(),
                    cfg.data.sales_path.display()
                ),
            );
        }
        Err(e) => print_health_item("Data", false, &format!("{e:#}")),
    }

    let agent = AgentService::from_config(&cfg);
    if agent.is_enabled() {
        let ok = agent.is_healthy();
        let detail = if ok {
            format!("reachable at {}", cfg.agent.url)
        } else {
            format!("not reachable at {}", cfg.agent.url)
        };
        print_health_item("Agent", ok, &detail);
    } else {
        print_health_item("Agent", false, "disabled (set DEMANDBOARD_AGENT=1 to enable)");
    }

    match agent.history().path() {
        Some(path) => {
            let entries = agent.history().read_all().len();
            print_health_item(
                "History log",
                path.exists(),
                &format!("{entries} entries in {}", path.display()),
            );
        }
        None => print_health_item("History log", false, "disabled"),
    }

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".yellow().bold()
    };
    println!("  {} {:<16} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// demandboard config
// ---------------------------------------------------------------------------

/// Print the effective configuration and where it came from.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective demandboard Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.demandboard/config.toml", global_exists);
    print_source("demandboard.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "DEMANDBOARD_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.demandboard/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Cut `s` to at most `max_len` characters, marking the cut with `…`.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("csv")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_str_opt(Some("table")), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(Some("xml")), OutputFormat::Table);
    }

    #[test]
    fn truncate_short_strings_unchanged() {
        assert_eq!(truncate("SKU_001", 12), "SKU_001");
        assert_eq!(truncate("", 5), "");
    }

    #[test]
    fn truncate_long_strings_marks_cut() {
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
        assert_eq!(truncate("äöüäöü", 4).chars().count(), 4);
    }
}
