use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::error::FetchError;

use super::{DailyBar, FetchResult};

pub const ERROR_MESSAGE_FIELD: &str = "Error Message";
pub const NOTE_FIELD: &str = "Note";
pub const INFORMATION_FIELD: &str = "Information";
pub const TIME_SERIES_FIELD: &str = "Time Series (Daily)";

const OPEN_FIELD: &str = "1. open";
const HIGH_FIELD: &str = "2. high";
const LOW_FIELD: &str = "3. low";
const CLOSE_FIELD: &str = "4. close";
const VOLUME_FIELD: &str = "5. volume";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Phrases the upstream uses in its throttling notices.
const RATE_LIMIT_MARKERS: &[&str] = &["API call frequency", "API rate limit"];

/// The one place that decides whether a notice string means "slow down".
pub fn is_rate_limit_notice(text: &str) -> bool {
    RATE_LIMIT_MARKERS.iter().any(|marker| text.contains(marker))
}

/// Decode a raw response body into at most `max_bars` bars, oldest first.
pub fn decode_daily_body(body: &str, symbol: &str, max_bars: usize) -> FetchResult<Vec<DailyBar>> {
    let root: Value = serde_json::from_str(body)
        .map_err(|err| FetchError::unexpected(symbol, format!("invalid JSON body ({err})")))?;

    let series = classify_payload(&root, symbol)?;
    normalize_series(series, symbol, max_bars)
}

/// Inspect a decoded payload and either hand back the non-empty daily series
/// or the error it signals.
///
/// Precedence: explicit error field, then rate-limit notice, then a missing or
/// empty series.
pub fn classify_payload<'a>(root: &'a Value, symbol: &str) -> FetchResult<&'a Map<String, Value>> {
    let Some(object) = root.as_object() else {
        return Err(FetchError::unexpected(symbol, "response is not a JSON object"));
    };

    if object.contains_key(ERROR_MESSAGE_FIELD) {
        return Err(FetchError::InvalidSymbol {
            symbol: symbol.to_string(),
        });
    }

    let throttled = [NOTE_FIELD, INFORMATION_FIELD]
        .iter()
        .filter_map(|field| object.get(*field).and_then(Value::as_str))
        .any(is_rate_limit_notice);
    if throttled {
        return Err(FetchError::RateLimited);
    }

    match object.get(TIME_SERIES_FIELD) {
        None | Some(Value::Null) => Err(FetchError::NoData {
            symbol: symbol.to_string(),
        }),
        Some(Value::Object(series)) if series.is_empty() => Err(FetchError::NoData {
            symbol: symbol.to_string(),
        }),
        Some(Value::Object(series)) => Ok(series),
        Some(_) => Err(FetchError::unexpected(
            symbol,
            format!("`{TIME_SERIES_FIELD}` is not an object"),
        )),
    }
}

/// Parse every entry, keep the newest `max_bars` trading days and return them
/// oldest-to-newest.
///
/// Entries are ordered by their date key rather than by map iteration order,
/// so the result does not depend on how the upstream lays out its keys.
pub fn normalize_series(
    series: &Map<String, Value>,
    symbol: &str,
    max_bars: usize,
) -> FetchResult<Vec<DailyBar>> {
    let mut bars = series
        .iter()
        .map(|(date, fields)| parse_bar(date, fields, symbol))
        .collect::<FetchResult<Vec<_>>>()?;

    bars.sort_by(|a, b| b.date.cmp(&a.date));
    bars.truncate(max_bars);
    bars.reverse();

    Ok(bars)
}

fn parse_bar(date: &str, fields: &Value, symbol: &str) -> FetchResult<DailyBar> {
    let date = NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map_err(|_| FetchError::unexpected(symbol, format!("invalid date key `{date}`")))?;

    let price = |field: &str| -> FetchResult<f64> {
        fields
            .get(field)
            .and_then(parse_number)
            .filter(|value| value.is_finite())
            .ok_or_else(|| {
                FetchError::unexpected(symbol, format!("missing or invalid `{field}` on {date}"))
            })
    };

    let volume = fields
        .get(VOLUME_FIELD)
        .and_then(parse_volume)
        .ok_or_else(|| {
            FetchError::unexpected(
                symbol,
                format!("missing or invalid `{VOLUME_FIELD}` on {date}"),
            )
        })?;

    Ok(DailyBar {
        date,
        open: price(OPEN_FIELD)?,
        high: price(HIGH_FIELD)?,
        low: price(LOW_FIELD)?,
        close: price(CLOSE_FIELD)?,
        volume,
    })
}

fn parse_number(value: &Value) -> Option<f64> {
    value
        .as_str()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .or_else(|| value.as_f64())
}

fn parse_volume(value: &Value) -> Option<u64> {
    value
        .as_str()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .or_else(|| value.as_u64())
}
