pub mod binding;
pub mod bootstrap;
pub mod controller;
pub mod dashboard;
pub mod state;

pub use binding::SeriesBinding;
pub use controller::DashboardController;
pub use dashboard::{DashboardAction, DashboardState, InputMode};
pub use state::{FetchState, Stats};
