use chrono::{DateTime, Local, NaiveDate};

use crate::fetch::{DailyBar, FetchResult};

/// Outcome of the most recent series request, as seen by the view layer.
///
/// A new request clears the previous records and error before anything
/// resolves; a completed request leaves either records or an error, never
/// both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchState {
    symbol: Option<String>,
    records: Vec<DailyBar>,
    loading: bool,
    error: Option<String>,
    updated_at: Option<DateTime<Local>>,
}

impl FetchState {
    /// Reset for a new request on `symbol`.
    pub fn begin(&mut self, symbol: &str) {
        self.symbol = Some(symbol.to_string());
        self.records.clear();
        self.error = None;
        self.loading = true;
    }

    /// Apply the outcome of the request started by the last [`begin`](Self::begin).
    pub fn resolve(&mut self, result: FetchResult<Vec<DailyBar>>) {
        self.loading = false;
        self.updated_at = Some(Local::now());
        match result {
            Ok(records) => {
                self.records = records;
                self.error = None;
            }
            Err(err) => {
                self.records.clear();
                self.error = Some(err.to_string());
            }
        }
    }

    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    pub fn records(&self) -> &[DailyBar] {
        &self.records
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn updated_at(&self) -> Option<&DateTime<Local>> {
        self.updated_at.as_ref()
    }

    pub fn has_records(&self) -> bool {
        !self.records.is_empty()
    }

    /// Summary of the most recent bar, when one is available and no request is pending.
    pub fn latest(&self) -> Option<Stats> {
        if self.loading {
            return None;
        }
        self.records.last().map(Stats::from)
    }
}

/// Headline numbers shown on the stat cards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub date: NaiveDate,
    pub price: f64,
    pub high: f64,
    pub low: f64,
    pub volume: u64,
}

impl From<&DailyBar> for Stats {
    fn from(bar: &DailyBar) -> Self {
        Self {
            date: bar.date,
            price: bar.close,
            high: bar.high,
            low: bar.low,
            volume: bar.volume,
        }
    }
}
