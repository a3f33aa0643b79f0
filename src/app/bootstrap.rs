use std::fmt::Write as _;

use log::info;

use crate::app::{DashboardController, SeriesBinding, Stats};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::fetch::{DailyBar, MarketDataClient};
use crate::ui::run_dashboard;
use crate::utils::{format_price, format_volume};

/// Entry point used by `main` to bootstrap the dashboard stack.
pub async fn run(config: Config) -> Result<()> {
    let client = MarketDataClient::new(&config.api)?;
    let binding = SeriesBinding::new(client, config.api.timeout);
    let mut controller = DashboardController::new(&config.dashboard, binding);

    info!(
        "starting dashboard on {} ({} known symbols)",
        config.dashboard.default_symbol,
        config.dashboard.symbols.len()
    );

    // The event loop blocks on terminal input; keep it off the async workers.
    tokio::task::block_in_place(|| run_dashboard(&mut controller))
}

/// Fetch one symbol and print its bars and headline numbers to stdout.
pub async fn show(config: Config, symbol: &str) -> Result<()> {
    let client = MarketDataClient::new(&config.api)?;
    let bars = client.fetch_daily(symbol).await.map_err(AppError::from)?;
    print!("{}", series_report(symbol, &bars));
    Ok(())
}

fn series_report(symbol: &str, bars: &[DailyBar]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} - {} trading days", symbol, bars.len());
    let _ = writeln!(
        out,
        "{:<10}  {:>10}  {:>10}  {:>10}  {:>10}  {:>14}",
        "Date", "Open", "High", "Low", "Close", "Volume"
    );
    for bar in bars {
        let _ = writeln!(
            out,
            "{:<10}  {:>10}  {:>10}  {:>10}  {:>10}  {:>14}",
            bar.label(),
            format_price(bar.open),
            format_price(bar.high),
            format_price(bar.low),
            format_price(bar.close),
            format_volume(bar.volume)
        );
    }

    if let Some(stats) = bars.last().map(Stats::from) {
        let _ = writeln!(
            out,
            "\nLatest {}: price {}  high {}  low {}  volume {}",
            stats.date.format("%Y-%m-%d"),
            format_price(stats.price),
            format_price(stats.high),
            format_price(stats.low),
            format_volume(stats.volume)
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn report_lists_bars_and_latest_stats() {
        let bars = vec![
            DailyBar {
                date: NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
                open: 160.0,
                high: 162.5,
                low: 159.1,
                close: 161.1,
                volume: 3_500_000,
            },
            DailyBar {
                date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
                open: 161.0,
                high: 163.0,
                low: 160.2,
                close: 162.4,
                volume: 4_012_345,
            },
        ];

        let report = series_report("IBM", &bars);
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines[0], "IBM - 2 trading days");
        assert!(lines[2].starts_with("2024-01-04"));
        assert!(lines[3].contains("$162.40"));
        assert!(report.contains("Latest 2024-01-05: price $162.40"));
        assert!(report.contains("volume 4,012,345"));
    }

    #[test]
    fn empty_report_has_no_stats_line() {
        let report = series_report("IBM", &[]);
        assert!(report.starts_with("IBM - 0 trading days"));
        assert!(!report.contains("Latest"));
    }
}
