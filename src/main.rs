use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use demandboard::cli;
use demandboard::data::generator::GeneratorParams;
use demandboard::grid::Bucket;

#[derive(Debug, Parser)]
#[command(name = "demandboard")]
#[command(about = "Demand plan dashboard: charts, plan table and planning agent")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the web dashboard
    Serve {
        /// Listen address, host:port (default from config: 127.0.0.1:8000)
        #[arg(long)]
        addr: Option<String>,
        /// Don't open a browser window
        #[arg(long)]
        no_browser: bool,
    },
    /// Print the plan table
    Table {
        /// Case-insensitive SKU substring filter
        #[arg(long, default_value = "")]
        sku: String,
        /// Column granularity: weekly (default) or monthly
        #[arg(long, default_value = "weekly")]
        bucket: Bucket,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Ask the agent for a chart configuration
    Chart {
        /// What to plot
        #[arg(trailing_var_arg = true, required = true)]
        query: Vec<String>,
        /// Output format: table (summary, default) or json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Send a message to the agent ("run planning" starts a planning cycle)
    Chat {
        #[arg(trailing_var_arg = true, required = true)]
        message: Vec<String>,
    },
    /// Show logged agent interactions
    History {
        /// Number of most recent entries to show
        #[arg(long, default_value = "20")]
        limit: usize,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Write a synthetic sales history and demand plan as CSV
    Generate {
        #[arg(long, default_value = "10")]
        skus: usize,
        /// Weeks of sales history
        #[arg(long, default_value = "104")]
        weeks: usize,
        /// First week, YYYY-MM-DD
        #[arg(long, default_value = "2024-01-01")]
        start: String,
        /// Weeks of forecast horizon
        #[arg(long, default_value = "12")]
        horizon: usize,
        #[arg(long, default_value = "42")]
        seed: u64,
        /// Output directory (default: the configured data paths)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Check config, data files and agent connectivity
    Health,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write a default config to ~/.demandboard/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a key, e.g. `agent.url http://host:8100`
    Set { key: String, value: String },
    /// Reset the global config to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Serve { addr, no_browser } => cli::run_serve(addr, no_browser),
        Commands::Table {
            sku,
            bucket,
            format,
        } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_table(&sku, bucket, fmt)
        }
        Commands::Chart { query, format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_chart(&query.join(" "), fmt)
        }
        Commands::Chat { message } => cli::run_chat(&message.join(" ")),
        Commands::History { limit, format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_history(limit, fmt)
        }
        Commands::Generate {
            skus,
            weeks,
            start,
            horizon,
            seed,
            out,
        } => {
            let params = GeneratorParams {
                num_skus: skus,
                weeks,
                start_date: start,
                horizon,
                seed,
            };
            cli::run_generate(&params, out.as_deref())
        }
        Commands::Health => cli::run_health(),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
