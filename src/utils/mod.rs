pub mod text;
pub mod time;

pub use text::{format_price, format_volume, is_ticker, normalize_symbol};
pub use time::format_updated_at;
