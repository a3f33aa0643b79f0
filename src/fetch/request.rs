use reqwest::Url;

use crate::error::{AppError, Context, Result};

const REDACTED: &str = "***";

/// One `TIME_SERIES_DAILY`-style query against the configured endpoint.
#[derive(Debug, Clone)]
pub struct DailyRequest {
    url: Url,
}

impl DailyRequest {
    pub fn new(endpoint: &Url, function: &str, symbol: &str, api_key: &str) -> Self {
        let mut url = endpoint.clone();
        url.query_pairs_mut()
            .append_pair("function", function)
            .append_pair("symbol", symbol)
            .append_pair("apikey", api_key);
        Self { url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The request URL with the access key masked, safe for logs.
    pub fn redacted(&self) -> String {
        let mut url = self.url.clone();
        let pairs: Vec<(String, String)> = self
            .url
            .query_pairs()
            .map(|(key, value)| {
                let value = if key == "apikey" {
                    REDACTED.to_string()
                } else {
                    value.into_owned()
                };
                (key.into_owned(), value)
            })
            .collect();
        url.query_pairs_mut().clear().extend_pairs(pairs);
        url.to_string()
    }
}

pub fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let url = Url::parse(endpoint.trim())
        .with_context(|| format!("Invalid API endpoint: {}", endpoint))?;
    if url.cannot_be_a_base() {
        return Err(AppError::message(format!(
            "API endpoint cannot carry query parameters: {}",
            endpoint
        )));
    }
    Ok(url)
}

/// Expand `${NAME}` placeholders from the process environment.
pub fn expand_env_vars(value: &str) -> Result<String> {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut name = String::new();
            let mut closed = false;
            while let Some(&next) = chars.peek() {
                chars.next();
                if next == '}' {
                    closed = true;
                    break;
                }
                name.push(next);
            }

            if name.is_empty() {
                return Err(AppError::message(
                    "Encountered empty environment placeholder in API key",
                ));
            }

            if !closed {
                return Err(AppError::message(
                    "Unterminated environment placeholder in API key",
                ));
            }

            let value = std::env::var(&name).with_context(|| {
                format!(
                    "Environment variable {} required by the API key is not set",
                    name
                )
            })?;
            result.push_str(&value);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint() -> Url {
        parse_endpoint("https://www.alphavantage.co/query").expect("endpoint")
    }

    #[test]
    fn builds_daily_query() {
        let request = DailyRequest::new(&endpoint(), "TIME_SERIES_DAILY", "IBM", "demo");
        assert_eq!(
            request.url().as_str(),
            "https://www.alphavantage.co/query?function=TIME_SERIES_DAILY&symbol=IBM&apikey=demo"
        );
    }

    #[test]
    fn encodes_symbol_characters() {
        let request = DailyRequest::new(&endpoint(), "TIME_SERIES_DAILY", "BRK B&X", "k");
        assert!(request.url().as_str().contains("symbol=BRK+B%26X"));
    }

    #[test]
    fn redacts_api_key() {
        let request = DailyRequest::new(&endpoint(), "TIME_SERIES_DAILY", "IBM", "s3cret");
        let redacted = request.redacted();
        assert!(!redacted.contains("s3cret"));
        assert!(redacted.contains("apikey=***") || redacted.contains("apikey=%2A%2A%2A"));
        assert!(redacted.contains("symbol=IBM"));
    }

    #[test]
    fn rejects_unparseable_endpoint() {
        assert!(parse_endpoint("not a url").is_err());
        assert!(parse_endpoint("mailto:someone@example.com").is_err());
    }

    #[test]
    fn expands_environment_placeholders() {
        std::env::set_var("MARKET_DASH_TEST_KEY", "abc123");
        assert_eq!(
            expand_env_vars("${MARKET_DASH_TEST_KEY}").expect("expand"),
            "abc123"
        );
        assert_eq!(expand_env_vars("plain").expect("plain"), "plain");
    }

    #[test]
    fn rejects_malformed_placeholders() {
        let err = expand_env_vars("${}").expect_err("empty placeholder");
        assert!(err.to_string().contains("empty environment placeholder"));

        let err = expand_env_vars("${OPEN").expect_err("unterminated");
        assert!(err.to_string().contains("Unterminated"));

        let err = expand_env_vars("${MARKET_DASH_SURELY_UNSET_VAR}").expect_err("unset");
        assert!(err.to_string().contains("MARKET_DASH_SURELY_UNSET_VAR"));
    }
}
