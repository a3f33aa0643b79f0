use std::{fs, path::Path, time::Duration};

use serde::Deserialize;

use crate::error::{Context, Result};

use super::Config;

/// Load a JSON configuration file and layer it over the builtin defaults.
///
/// Validation is left to the caller so command-line overrides can apply first.
pub fn load_config(path: &Path) -> Result<Config> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read config JSON at {}", path.display()))?;

    let config = parse_config(&json)
        .with_context(|| format!("failed to parse config JSON at {}", path.display()))?;

    Ok(config)
}

/// Merge a JSON document over [`Config::builtin`]; absent fields keep their defaults.
pub fn parse_config(json: &str) -> std::result::Result<Config, serde_json::Error> {
    let raw: RawConfig = serde_json::from_str(json)?;
    Ok(raw.merge_into(Config::builtin()))
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    api: RawApiConfig,
    #[serde(default)]
    dashboard: RawDashboardConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RawApiConfig {
    endpoint: Option<String>,
    function: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
    max_bars: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RawDashboardConfig {
    default_symbol: Option<String>,
    symbols: Option<Vec<String>>,
    dark_mode: Option<bool>,
}

impl RawConfig {
    fn merge_into(self, mut config: Config) -> Config {
        let RawConfig { api, dashboard } = self;

        if let Some(endpoint) = api.endpoint {
            config.api.endpoint = endpoint;
        }
        if let Some(function) = api.function {
            config.api.function = function;
        }
        if let Some(api_key) = api.api_key {
            config.api.api_key = api_key;
        }
        if let Some(secs) = api.timeout_secs {
            config.api.timeout = Duration::from_secs(secs);
        }
        if let Some(max_bars) = api.max_bars {
            config.api.max_bars = max_bars;
        }

        if let Some(symbol) = dashboard.default_symbol {
            config.dashboard.default_symbol = symbol.trim().to_uppercase();
        }
        if let Some(symbols) = dashboard.symbols {
            config.dashboard.symbols = symbols
                .into_iter()
                .map(|symbol| symbol.trim().to_uppercase())
                .collect();
        }
        if let Some(dark_mode) = dashboard.dark_mode {
            config.dashboard.dark_mode = dark_mode;
        }

        config
    }
}
