use std::borrow::Cow;

use ratatui::prelude::Stylize;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Palette for one of the two dashboard themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub background: Color,
    pub surface: Color,
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub border: Color,
    pub line: Color,
    pub up: Color,
    pub down: Color,
    pub unchanged: Color,
    pub error_bg: Color,
    pub error_fg: Color,
}

impl Theme {
    pub fn for_mode(dark_mode: bool) -> Self {
        if dark_mode {
            Self::dark()
        } else {
            Self::light()
        }
    }

    pub fn light() -> Self {
        Self {
            background: Color::Rgb(243, 244, 246),
            surface: Color::Rgb(255, 255, 255),
            text: Color::Rgb(17, 24, 39),
            muted: Color::Rgb(75, 85, 99),
            accent: Color::Rgb(37, 99, 235),
            border: Color::Rgb(209, 213, 219),
            line: Color::Rgb(59, 130, 246),
            up: Color::Rgb(5, 150, 105),
            down: Color::Rgb(220, 38, 38),
            unchanged: Color::Rgb(107, 114, 128),
            error_bg: Color::Rgb(254, 226, 226),
            error_fg: Color::Rgb(153, 27, 27),
        }
    }

    pub fn dark() -> Self {
        Self {
            background: Color::Rgb(17, 24, 39),
            surface: Color::Rgb(31, 41, 55),
            text: Color::Rgb(243, 244, 246),
            muted: Color::Rgb(209, 213, 219),
            accent: Color::Rgb(37, 99, 235),
            border: Color::Rgb(75, 85, 99),
            line: Color::Rgb(16, 185, 129),
            up: Color::Rgb(16, 185, 129),
            down: Color::Rgb(239, 68, 68),
            unchanged: Color::Rgb(156, 163, 175),
            error_bg: Color::Rgb(127, 29, 29),
            error_fg: Color::Rgb(254, 226, 226),
        }
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }

    pub fn panel(&self) -> Style {
        Style::default().fg(self.text).bg(self.surface)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    /// Accent + bold, used for the active symbol and focused inputs.
    pub fn selection(&self) -> Style {
        Style::default()
            .fg(Color::White)
            .bg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// Produce a dimmed line for secondary descriptions and hints.
    pub fn secondary_line<'a>(&self, text: impl Into<Cow<'a, str>>) -> Line<'a> {
        Line::from(self.secondary_span(text))
    }

    pub fn secondary_span<'a>(&self, text: impl Into<Cow<'a, str>>) -> Span<'a> {
        let owned = text.into().into_owned();
        Span::from(owned).fg(self.muted)
    }

    pub fn header_span<'a>(&self, text: impl Into<Cow<'a, str>>) -> Span<'a> {
        let owned = text.into().into_owned();
        Span::from(owned).bold().fg(self.accent)
    }
}
