/// Configuration schema and defaults for demandboard.
///
/// Defines the TOML-serializable configuration structure with all sections:
/// `[server]`, `[data]`, `[chart]`, `[agent]`, and `[history]`.
///
/// Every field has a sensible built-in default. Users only need to set the
/// values they want to override.
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level demandboard configuration.
///
/// Maps directly to the `~/.demandboard/config.toml` and `demandboard.toml`
/// file schemas. All sections and fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub chart: ChartConfig,
    pub agent: AgentConfig,
    pub history: HistoryConfig,
}

// ---------------------------------------------------------------------------
// [server]
// ---------------------------------------------------------------------------

/// Dashboard HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address, `host:port`.
    pub addr: String,
    /// Open the dashboard in the default browser on start.
    pub open_browser: bool,
    /// Print one line per handled request.
    pub access_log: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8000".to_string(),
            open_browser: true,
            access_log: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [data]
// ---------------------------------------------------------------------------

/// Input files and dashboard summary sizes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Plan CSV (`SKU, Date, Baseline_P50, Plan, Constrained_Plan, Upside`).
    pub plan_path: PathBuf,
    /// Sales history CSV (`Date, SKU, Sales`).
    pub sales_path: PathBuf,
    /// Weeks of history shown on the dashboard.
    pub history_weeks: u32,
    /// Number of SKUs in the top-products chart.
    pub top_products: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            plan_path: PathBuf::from("data/final_plan.csv"),
            sales_path: PathBuf::from("data/sales_data.csv"),
            history_weeks: 12,
            top_products: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// [chart]
// ---------------------------------------------------------------------------

/// Chart rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Line series longer than this are reduced to min/max/closest-to-mean.
    pub decimation_threshold: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            decimation_threshold: crate::chart::DEFAULT_THRESHOLD,
        }
    }
}

// ---------------------------------------------------------------------------
// [agent]
// ---------------------------------------------------------------------------

/// Remote planning agent settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// When false, chat and chart requests are answered locally with a
    /// "disabled" message.
    pub enabled: bool,
    /// Agent base URL.
    pub url: String,
    /// Request timeout in milliseconds. Planning runs can take a while.
    pub timeout_ms: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "http://localhost:8100".to_string(),
            timeout_ms: 120_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [history]
// ---------------------------------------------------------------------------

/// Interaction history log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Record chat exchanges to the JSONL log.
    pub enabled: bool,
    /// Log file; defaults to `~/.demandboard/interactions.jsonl` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl BoardConfig {
    /// Annotated default config written by `demandboard config init`.
    pub fn default_toml() -> &'static str {
        DEFAULT_TOML
    }
}

const DEFAULT_TOML: &str = r#"# demandboard configuration
#
# Layers (later wins): built-in defaults, ~/.demandboard/config.toml,
# ./demandboard.toml, DEMANDBOARD_* environment variables.

[server]
# Listen address for `demandboard serve`.
addr = "127.0.0.1:8000"
open_browser = true
access_log = true

[data]
plan_path = "data/final_plan.csv"
sales_path = "data/sales_data.csv"
# Weeks of sales history on the dashboard chart.
history_weeks = 12
# SKUs in the top-products chart.
top_products = 5

[chart]
# Line series longer than this show only min, max and closest-to-mean.
decimation_threshold = 20

[agent]
enabled = true
url = "http://localhost:8100"
timeout_ms = 120000

[history]
enabled = true
# path = "/custom/interactions.jsonl"
"#;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = BoardConfig::default();
        assert_eq!(cfg.server.addr, "127.0.0.1:8000");
        assert_eq!(cfg.data.history_weeks, 12);
        assert_eq!(cfg.data.top_products, 5);
        assert_eq!(cfg.chart.decimation_threshold, 20);
        assert!(cfg.agent.enabled);
        assert!(cfg.history.path.is_none());
    }

    #[test]
    fn default_toml_parses_to_defaults() {
        let cfg: BoardConfig = toml::from_str(BoardConfig::default_toml()).unwrap();
        let def = BoardConfig::default();
        assert_eq!(cfg.server.addr, def.server.addr);
        assert_eq!(cfg.data.plan_path, def.data.plan_path);
        assert_eq!(cfg.agent.url, def.agent.url);
        assert_eq!(cfg.agent.timeout_ms, def.agent.timeout_ms);
        assert_eq!(cfg.chart.decimation_threshold, def.chart.decimation_threshold);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: BoardConfig = toml::from_str("[chart]\ndecimation_threshold = 50\n").unwrap();
        assert_eq!(cfg.chart.decimation_threshold, 50);
        assert_eq!(cfg.data.history_weeks, 12);
    }

    #[test]
    fn serializes_round_trip() {
        let text = toml::to_string_pretty(&BoardConfig::default()).unwrap();
        let back: BoardConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.server.addr, "127.0.0.1:8000");
    }
}
