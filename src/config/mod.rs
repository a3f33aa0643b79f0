use std::time::Duration;

pub mod loader;
pub mod validator;

pub use loader::load_config;
pub use validator::validate_config;

pub const DEFAULT_ENDPOINT: &str = "https://www.alphavantage.co/query";
pub const DEFAULT_FUNCTION: &str = "TIME_SERIES_DAILY";
pub const DEFAULT_API_KEY: &str = "demo";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
/// Number of most recent trading days kept from each response.
pub const DEFAULT_MAX_BARS: usize = 30;
pub const DEFAULT_SYMBOL: &str = "IBM";

/// Upstream API settings used by the market-data fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub endpoint: String,
    pub function: String,
    /// Access key; `${VAR}` placeholders are expanded when a request is built.
    pub api_key: String,
    pub timeout: Duration,
    pub max_bars: usize,
}

/// Initial presentation state of the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub default_symbol: String,
    pub symbols: Vec<String>,
    pub dark_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api: ApiConfig,
    pub dashboard: DashboardConfig,
}

impl Config {
    pub fn builtin() -> Self {
        Self {
            api: ApiConfig {
                endpoint: DEFAULT_ENDPOINT.to_string(),
                function: DEFAULT_FUNCTION.to_string(),
                api_key: DEFAULT_API_KEY.to_string(),
                timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
                max_bars: DEFAULT_MAX_BARS,
            },
            dashboard: DashboardConfig {
                default_symbol: DEFAULT_SYMBOL.to_string(),
                symbols: vec!["IBM".to_string(), "AAPL".to_string()],
                dark_mode: false,
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::builtin()
    }
}
