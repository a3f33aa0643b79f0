use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::DashboardConfig;
use crate::utils::normalize_symbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Search,
}

/// What the controller should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardAction {
    Continue,
    Select(String),
    Reload,
    Quit,
}

/// Presentation state owned by the dashboard: which symbol is active, which
/// symbols are offered as shortcuts, the theme and the search box.
#[derive(Debug, Clone)]
pub struct DashboardState {
    active_symbol: String,
    symbols: Vec<String>,
    dark_mode: bool,
    search: String,
    input_mode: InputMode,
}

impl DashboardState {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            active_symbol: config.default_symbol.clone(),
            symbols: config.symbols.clone(),
            dark_mode: config.dark_mode,
            search: String::new(),
            input_mode: InputMode::Normal,
        }
    }

    pub fn active_symbol(&self) -> &str {
        &self.active_symbol
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    pub fn toggle_dark_mode(&mut self) {
        self.dark_mode = !self.dark_mode;
    }

    /// Shortcut buttons to show. While there is no data only the active symbol
    /// is offered, so a failing symbol doesn't look selectable alongside others.
    pub fn visible_symbols(&self, has_records: bool) -> Vec<&str> {
        self.symbols
            .iter()
            .filter(|symbol| has_records || **symbol == self.active_symbol)
            .map(String::as_str)
            .collect()
    }

    /// Add a symbol to the shortcut list once it has produced data.
    pub fn remember(&mut self, symbol: &str) {
        if !self.symbols.iter().any(|known| known == symbol) {
            self.symbols.push(symbol.to_string());
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, has_records: bool) -> DashboardAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return DashboardAction::Quit;
        }

        match self.input_mode {
            InputMode::Search => self.handle_search_key(key),
            InputMode::Normal => self.handle_normal_key(key, has_records),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> DashboardAction {
        match key.code {
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                match normalize_symbol(&self.search) {
                    Some(symbol) => {
                        self.search.clear();
                        self.select(symbol)
                    }
                    None => DashboardAction::Continue,
                }
            }
            KeyCode::Esc => {
                self.search.clear();
                self.input_mode = InputMode::Normal;
                DashboardAction::Continue
            }
            KeyCode::Backspace => {
                self.search.pop();
                DashboardAction::Continue
            }
            KeyCode::Char(ch) if !ch.is_control() => {
                self.search.push(ch);
                DashboardAction::Continue
            }
            _ => DashboardAction::Continue,
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent, has_records: bool) -> DashboardAction {
        match key.code {
            KeyCode::Char('q') => DashboardAction::Quit,
            KeyCode::Char('/') | KeyCode::Char('s') => {
                self.input_mode = InputMode::Search;
                DashboardAction::Continue
            }
            KeyCode::Char('d') => {
                self.toggle_dark_mode();
                DashboardAction::Continue
            }
            KeyCode::Char('r') => DashboardAction::Reload,
            KeyCode::Left | KeyCode::Char('h') => self.step(-1, has_records),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => self.step(1, has_records),
            KeyCode::Char(ch @ '1'..='9') => {
                let idx = ch as usize - '1' as usize;
                match self.visible_symbols(has_records).get(idx) {
                    Some(symbol) => {
                        let symbol = symbol.to_string();
                        self.select(symbol)
                    }
                    None => DashboardAction::Continue,
                }
            }
            _ => DashboardAction::Continue,
        }
    }

    fn step(&mut self, delta: isize, has_records: bool) -> DashboardAction {
        let visible = self.visible_symbols(has_records);
        if visible.is_empty() {
            return DashboardAction::Continue;
        }

        let len = visible.len() as isize;
        let next = match visible.iter().position(|s| *s == self.active_symbol) {
            Some(current) => (current as isize + delta).rem_euclid(len),
            None => 0,
        };
        let symbol = visible[next as usize].to_string();
        self.select(symbol)
    }

    fn select(&mut self, symbol: String) -> DashboardAction {
        self.active_symbol = symbol.clone();
        DashboardAction::Select(symbol)
    }
}
