/// Turn raw search input into a ticker: trimmed and upper-cased.
///
/// Returns `None` for blank input. No further validation happens here; the
/// upstream API is the judge of whether a symbol exists.
pub fn normalize_symbol(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

/// Loose ticker shape check used for configured symbols (`IBM`, `BRK.B`, `BTC-USD`).
pub fn is_ticker(symbol: &str) -> bool {
    !symbol.is_empty()
        && symbol
            .chars()
            .all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit() || matches!(ch, '.' | '-'))
}

pub fn format_price(value: f64) -> String {
    format!("${:.2}", value)
}

/// Render a share count with thousands separators, e.g. `1234567` -> `1,234,567`.
pub fn format_volume(volume: u64) -> String {
    let digits = volume.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}
