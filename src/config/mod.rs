/// Configuration system for demandboard.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: hardcoded in [`schema::BoardConfig::default()`]
/// 2. **User global config**: `~/.demandboard/config.toml`
/// 3. **Project local config**: `demandboard.toml` in the current directory
/// 4. **Environment variables**: `DEMANDBOARD_*` overrides (highest precedence)
///
/// A later file layer replaces the earlier one; missing keys inside a file
/// fall back to built-in defaults.
///
/// # Usage
///
/// ```rust,ignore
/// use demandboard::config;
///
/// let cfg = config::load();
/// let state = AppState::load(&cfg.data)?;
/// ```
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::BoardConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars.
pub fn load() -> BoardConfig {
    let mut config = BoardConfig::default();

    if let Some(global) = load_toml_file(global_config_path()) {
        config = global;
    }

    if let Some(project) = load_toml_file(project_config_path()) {
        config = project;
    }

    apply_env_overrides(&mut config);

    config
}

/// Load a TOML config file from the given path (if it exists).
///
/// Returns `None` if the path is `None`, the file doesn't exist, or the
/// content is malformed. A broken config file never stops the dashboard.
fn load_toml_file(path: Option<PathBuf>) -> Option<BoardConfig> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    match toml::from_str(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            eprintln!("warning: ignoring malformed config {}: {e}", path.display());
            None
        }
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Directory for user-level state: `~/.demandboard/`.
pub fn home_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".demandboard"))
}

fn global_config_path() -> Option<PathBuf> {
    home_dir().map(|dir| dir.join("config.toml"))
}

fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join("demandboard.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `DEMANDBOARD_ADDR`: server listen address
/// - `DEMANDBOARD_PLAN_PATH` / `DEMANDBOARD_SALES_PATH`: input files
/// - `DEMANDBOARD_AGENT`: agent enabled (`1`/`true`/`yes`/`on`)
/// - `DEMANDBOARD_AGENT_URL`: agent base URL
/// - `DEMANDBOARD_AGENT_TIMEOUT_MS`: agent request timeout
/// - `DEMANDBOARD_HISTORY_PATH`: interaction log file
fn apply_env_overrides(config: &mut BoardConfig) {
    if let Ok(val) = std::env::var("DEMANDBOARD_ADDR")
        && !val.is_empty()
    {
        config.server.addr = val;
    }
    if let Ok(val) = std::env::var("DEMANDBOARD_PLAN_PATH")
        && !val.is_empty()
    {
        config.data.plan_path = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var("DEMANDBOARD_SALES_PATH")
        && !val.is_empty()
    {
        config.data.sales_path = PathBuf::from(val);
    }

    if let Ok(val) = std::env::var("DEMANDBOARD_AGENT") {
        config.agent.enabled = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("DEMANDBOARD_AGENT_URL")
        && !val.is_empty()
    {
        config.agent.url = val;
    }
    if let Ok(val) = std::env::var("DEMANDBOARD_AGENT_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.agent.timeout_ms = ms;
    }

    if let Ok(val) = std::env::var("DEMANDBOARD_HISTORY_PATH")
        && !val.is_empty()
    {
        config.history.path = Some(PathBuf::from(val));
    }
}

/// Check if a string value represents a truthy boolean.
pub(crate) fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.demandboard/config.toml`.
///
/// Returns an error if the file already exists and `force` is false.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.demandboard/ directory")?;
    }

    fs::write(&path, BoardConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single dotted key (e.g. `agent.url`) in the global config file.
///
/// Starts from the existing file, or from serialized defaults when there is
/// none, so the written file always contains the key's section.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let content = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&BoardConfig::default())
            .context("failed to serialize default config")?
    };

    let mut root: toml::Value =
        toml::from_str(&content).context("failed to parse config as TOML value")?;
    set_toml_value(&mut root, key, value)?;

    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;
    // Reject edits that would no longer load.
    toml::from_str::<BoardConfig>(&output)
        .with_context(|| format!("value '{value}' is not valid for '{key}'"))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
///
/// The existing value's type decides how `raw_value` is parsed; unknown
/// leaves are stored as strings.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        anyhow::bail!("invalid config key '{key}'");
    }

    let mut current = root;
    for &part in &parts[..parts.len() - 1] {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let leaf = parts[parts.len() - 1];
    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Float(_)) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        _ => toml::Value::String(raw_value.to_string()),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_truthy_accepts_variants() {
        assert!(is_truthy("1"));
        assert!(is_truthy("true"));
        assert!(is_truthy("TRUE"));
        assert!(is_truthy("yes"));
        assert!(is_truthy("on"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("false"));
        assert!(!is_truthy("off"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn set_toml_value_updates_string() {
        let mut root: toml::Value = toml::from_str("[agent]\nurl = \"http://a\"\n").unwrap();
        set_toml_value(&mut root, "agent.url", "http://b:9000").unwrap();
        assert_eq!(root["agent"]["url"].as_str(), Some("http://b:9000"));
    }

    #[test]
    fn set_toml_value_updates_bool() {
        let mut root: toml::Value = toml::from_str("[agent]\nenabled = true\n").unwrap();
        set_toml_value(&mut root, "agent.enabled", "off").unwrap();
        assert_eq!(root["agent"]["enabled"].as_bool(), Some(false));
    }

    #[test]
    fn set_toml_value_updates_integer() {
        let mut root: toml::Value =
            toml::from_str("[chart]\ndecimation_threshold = 20\n").unwrap();
        set_toml_value(&mut root, "chart.decimation_threshold", "40").unwrap();
        assert_eq!(root["chart"]["decimation_threshold"].as_integer(), Some(40));
    }

    #[test]
    fn set_toml_value_rejects_bad_integer() {
        let mut root: toml::Value =
            toml::from_str("[chart]\ndecimation_threshold = 20\n").unwrap();
        assert!(set_toml_value(&mut root, "chart.decimation_threshold", "many").is_err());
    }

    #[test]
    fn set_toml_value_rejects_invalid_key() {
        let mut root: toml::Value = toml::from_str("[server]\naddr = \"x\"\n").unwrap();
        assert!(set_toml_value(&mut root, "nonexistent.key", "value").is_err());
        assert!(set_toml_value(&mut root, "server..addr", "value").is_err());
    }

    #[test]
    fn show_effective_config_returns_toml() {
        let toml_str = show_effective_config().unwrap();
        let _: BoardConfig = toml::from_str(&toml_str).unwrap();
    }
}
