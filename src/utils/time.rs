use chrono::{DateTime, Local};

pub fn format_updated_at(time: &DateTime<Local>) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}
