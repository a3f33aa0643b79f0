use crossterm::event::KeyEvent;
use log::info;

use crate::config::DashboardConfig;
use crate::fetch::DailySource;

use super::binding::SeriesBinding;
use super::dashboard::{DashboardAction, DashboardState};
use super::state::FetchState;

/// Whether the event loop should keep running after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

/// Couples the dashboard's selection state to the series binding.
pub struct DashboardController<S: DailySource> {
    dashboard: DashboardState,
    binding: SeriesBinding<S>,
}

impl<S: DailySource> DashboardController<S> {
    pub fn new(config: &DashboardConfig, binding: SeriesBinding<S>) -> Self {
        Self {
            dashboard: DashboardState::new(config),
            binding,
        }
    }

    pub fn dashboard(&self) -> &DashboardState {
        &self.dashboard
    }

    pub fn fetch_state(&self) -> &FetchState {
        self.binding.state()
    }

    /// Kick off the fetch for the initially active symbol.
    pub fn start(&mut self) {
        let symbol = self.dashboard.active_symbol().to_string();
        self.binding.request(&symbol);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> LoopControl {
        let has_records = self.binding.state().has_records();
        match self.dashboard.handle_key(key, has_records) {
            DashboardAction::Continue => {}
            DashboardAction::Select(symbol) => {
                if self.binding.request(&symbol) {
                    info!("switched to {}", symbol);
                }
            }
            DashboardAction::Reload => {
                self.binding.reload();
            }
            DashboardAction::Quit => return LoopControl::Exit,
        }
        LoopControl::Continue
    }

    /// Pick up finished requests. Returns whether anything visible changed.
    pub fn tick(&mut self) -> bool {
        let changed = self.binding.poll();
        if changed {
            self.after_update();
        }
        changed
    }

    /// Wait for the pending request, if any, then apply it.
    pub async fn settle(&mut self) -> bool {
        let changed = self.binding.settle().await;
        if changed {
            self.after_update();
        }
        changed
    }

    fn after_update(&mut self) {
        let state = self.binding.state();
        if state.has_records() {
            if let Some(symbol) = state.symbol() {
                self.dashboard.remember(symbol);
            }
        }
    }
}
