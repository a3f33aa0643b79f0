pub mod dashboard;

pub use dashboard::{draw_dashboard, run_dashboard};
