use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::utils::normalize_symbol;

#[derive(Debug, Parser)]
#[command(name = "market-dash")]
#[command(about = "Terminal dashboard for daily stock prices from Alpha Vantage")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// JSON config file merged over the builtin defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Alpha Vantage API key
    #[arg(long, env = "ALPHAVANTAGE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Symbol shown on startup
    #[arg(short, long)]
    pub symbol: Option<String>,

    /// Start in dark mode
    #[arg(long)]
    pub dark: bool,

    /// Write logs to this file (the dashboard is silent otherwise)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the daily bars for one symbol and exit
    Show {
        /// Stock symbol, e.g. IBM
        symbol: String,
    },
}

impl Cli {
    /// Apply command-line overrides on top of the loaded config.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(key) = &self.api_key {
            config.api.api_key = key.clone();
        }
        // Joins the shortcut row once its first fetch succeeds.
        if let Some(symbol) = self.symbol.as_deref().and_then(normalize_symbol) {
            config.dashboard.default_symbol = symbol;
        }
        if self.dark {
            config.dashboard.dark_mode = true;
        }
    }
}
