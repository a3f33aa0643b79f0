use chrono::NaiveDate;
use futures::future::{BoxFuture, FutureExt};
use log::{debug, warn};
use reqwest::{Client, Url};

use crate::config::ApiConfig;
use crate::error::{Context, FetchError, Result};

use super::decode::decode_daily_body;
use super::request::{expand_env_vars, parse_endpoint, DailyRequest};
use super::FetchResult;

/// One trading day's OHLCV summary.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl DailyBar {
    /// Date label used on chart axes and in tables.
    pub fn label(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    pub fn is_up(&self) -> bool {
        self.close > self.open
    }

    pub fn is_down(&self) -> bool {
        self.close < self.open
    }
}

/// Anything that can produce a daily series for a symbol.
pub trait DailySource: Send + Sync + 'static {
    fn fetch(&self, symbol: &str) -> BoxFuture<'static, FetchResult<Vec<DailyBar>>>;
}

/// HTTP client for the daily time-series endpoint.
#[derive(Debug, Clone)]
pub struct MarketDataClient {
    client: Client,
    endpoint: Url,
    function: String,
    api_key: String,
    max_bars: usize,
}

impl MarketDataClient {
    pub fn new(api: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(api.timeout)
            .build()
            .context("Failed to construct market data HTTP client")?;

        Ok(Self {
            client,
            endpoint: parse_endpoint(&api.endpoint)?,
            function: api.function.clone(),
            api_key: expand_env_vars(&api.api_key)?,
            max_bars: api.max_bars,
        })
    }

    /// Issue a single request and normalise the response. No retries.
    pub async fn fetch_daily(&self, symbol: &str) -> FetchResult<Vec<DailyBar>> {
        let result = self.fetch_daily_inner(symbol).await;
        match &result {
            Ok(bars) => debug!("received {} daily bars for {}", bars.len(), symbol),
            Err(err) => warn!("API error for {}: {}", symbol, err),
        }
        result
    }

    async fn fetch_daily_inner(&self, symbol: &str) -> FetchResult<Vec<DailyBar>> {
        let request = DailyRequest::new(&self.endpoint, &self.function, symbol, &self.api_key);
        debug!("requesting {}", request.redacted());

        let response = self
            .client
            .get(request.url().clone())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::network(format!("HTTP status {}", status)));
        }

        let body = response.text().await.map_err(transport_error)?;

        decode_daily_body(&body, symbol, self.max_bars)
    }
}

impl DailySource for MarketDataClient {
    fn fetch(&self, symbol: &str) -> BoxFuture<'static, FetchResult<Vec<DailyBar>>> {
        let this = self.clone();
        let symbol = symbol.to_string();
        async move { this.fetch_daily(&symbol).await }.boxed()
    }
}

// reqwest embeds the request URL in its messages; strip it so the key never
// reaches the UI or the logs.
fn transport_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::network("request timed out")
    } else {
        FetchError::network(err.without_url().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one canned HTTP response on a local port.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        format!("http://{addr}/query")
    }

    fn client_for(endpoint: String) -> MarketDataClient {
        let mut config = Config::builtin();
        config.api.endpoint = endpoint;
        config.api.timeout = Duration::from_secs(5);
        MarketDataClient::new(&config.api).expect("client")
    }

    #[tokio::test]
    async fn fetches_and_normalises_series() {
        let endpoint = serve_once(
            "200 OK",
            r#"{"Time Series (Daily)": {
                "2024-01-09": {"1. open": "3", "2. high": "4", "3. low": "2", "4. close": "3.5", "5. volume": "30"},
                "2024-01-08": {"1. open": "2", "2. high": "3", "3. low": "1", "4. close": "2.5", "5. volume": "20"}
            }}"#,
        )
        .await;

        let bars = client_for(endpoint).fetch_daily("IBM").await.expect("bars");

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].label(), "2024-01-08");
        assert_eq!(bars[1].volume, 30);
    }

    #[tokio::test]
    async fn non_success_status_is_a_network_error() {
        let endpoint = serve_once("503 Service Unavailable", "{}").await;

        let err = client_for(endpoint).fetch_daily("IBM").await.unwrap_err();

        assert!(
            matches!(&err, FetchError::Network { detail } if detail.contains("503")),
            "unexpected error: {err:?}"
        );
    }

    #[tokio::test]
    async fn refused_connection_is_a_network_error_without_the_key() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut config = Config::builtin();
        config.api.endpoint = format!("http://{addr}/query");
        config.api.api_key = "top-secret-key".to_string();
        let client = MarketDataClient::new(&config.api).expect("client");

        let err = client.fetch_daily("IBM").await.unwrap_err();

        assert!(matches!(err, FetchError::Network { .. }), "unexpected: {err:?}");
        assert!(!err.to_string().contains("top-secret-key"));
    }

    #[test]
    fn rejects_unusable_endpoint() {
        let mut config = Config::builtin();
        config.api.endpoint = "::not-a-url::".to_string();
        assert!(MarketDataClient::new(&config.api).is_err());
    }

    #[test]
    fn classifies_bar_direction() {
        let bar = DailyBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            open: 10.0,
            high: 12.0,
            low: 9.0,
            close: 11.0,
            volume: 1,
        };
        assert!(bar.is_up());
        assert!(!bar.is_down());
    }
}
