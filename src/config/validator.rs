use crate::error::{AppError, Result};
use crate::utils::is_ticker;

use super::{ApiConfig, Config, DashboardConfig};

/// Validate a merged configuration and surface every issue at once.
pub fn validate_config(config: &Config) -> Result<()> {
    let mut issues = Vec::new();

    validate_api(&config.api, &mut issues);
    validate_dashboard(&config.dashboard, &mut issues);

    if issues.is_empty() {
        Ok(())
    } else {
        Err(AppError::message(format!(
            "config invalid:\n  - {}",
            issues.join("\n  - ")
        )))
    }
}

fn validate_api(api: &ApiConfig, issues: &mut Vec<String>) {
    if api.endpoint.trim().is_empty() {
        issues.push("api.endpoint must not be empty".to_string());
    } else if !api.endpoint.starts_with("http://") && !api.endpoint.starts_with("https://") {
        issues.push(format!(
            "api.endpoint must be an http(s) URL, found `{}`",
            api.endpoint
        ));
    }

    if api.function.trim().is_empty() {
        issues.push("api.function must not be empty".to_string());
    }

    if api.api_key.trim().is_empty() {
        issues.push("api.api_key must not be empty".to_string());
    }

    if api.timeout.is_zero() {
        issues.push("api.timeout_secs must be greater than zero".to_string());
    }

    if api.max_bars == 0 {
        issues.push("api.max_bars must be greater than zero".to_string());
    }
}

fn validate_dashboard(dashboard: &DashboardConfig, issues: &mut Vec<String>) {
    if !is_ticker(&dashboard.default_symbol) {
        issues.push(format!(
            "dashboard.default_symbol `{}` is not a ticker",
            dashboard.default_symbol
        ));
    }

    let invalid: Vec<&str> = dashboard
        .symbols
        .iter()
        .filter(|symbol| !is_ticker(symbol))
        .map(String::as_str)
        .collect();

    if !invalid.is_empty() {
        issues.push(format!(
            "dashboard.symbols contains invalid entries: {}",
            invalid
                .iter()
                .map(|symbol| format!("`{symbol}`"))
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
}
