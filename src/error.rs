use thiserror::Error;

pub use anyhow::Context;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn message<T: Into<String>>(msg: T) -> Self {
        AppError::Message(msg.into())
    }
}

/// Outcome taxonomy for a single daily-series request.
///
/// The `Display` output is what the dashboard shows in its error banner, so
/// each message is written for end users.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Network error - failed to fetch data ({detail})")]
    Network { detail: String },
    #[error("Invalid stock symbol: {symbol}")]
    InvalidSymbol { symbol: String },
    #[error("API rate limit reached - try again in 1 minute")]
    RateLimited,
    #[error("No market data available for {symbol}")]
    NoData { symbol: String },
    #[error("Unexpected response for {symbol}: {detail}")]
    Unexpected { symbol: String, detail: String },
}

impl FetchError {
    pub fn network<T: Into<String>>(detail: T) -> Self {
        FetchError::Network {
            detail: detail.into(),
        }
    }

    pub fn unexpected<S: Into<String>, T: Into<String>>(symbol: S, detail: T) -> Self {
        FetchError::Unexpected {
            symbol: symbol.into(),
            detail: detail.into(),
        }
    }
}
