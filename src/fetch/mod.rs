use crate::error::FetchError;

pub mod daily;
pub mod decode;
pub mod request;

pub use daily::{DailyBar, DailySource, MarketDataClient};
pub use decode::{decode_daily_body, is_rate_limit_notice};

pub type FetchResult<T> = std::result::Result<T, FetchError>;
