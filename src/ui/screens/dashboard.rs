use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{prelude::*, widgets::*};

use crate::app::controller::{DashboardController, LoopControl};
use crate::app::{DashboardState, FetchState, InputMode, Stats};
use crate::error::Result;
use crate::fetch::DailySource;
use crate::ui::components::chart::{
    render_candlestick_chart, render_line_chart, render_placeholder,
};
use crate::ui::components::utils::{split_horizontal, split_vertical, tail_to_width};
use crate::ui::styles::Theme;
use crate::ui::TerminalGuard;
use crate::utils::{format_price, format_updated_at, format_volume};

const TICK: Duration = Duration::from_millis(120);
const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];
const SIDE_BY_SIDE_MIN_WIDTH: u16 = 100;
const SEARCH_PLACEHOLDER: &str = "Press / to search (e.g., AAPL, MSFT, BTC-USD)";

/// Run the dashboard until the user quits. Fetches the initial symbol on entry.
pub fn run_dashboard<S: DailySource>(controller: &mut DashboardController<S>) -> Result<()> {
    let mut guard = TerminalGuard::new()?;
    controller.start();

    let mut frame: usize = 0;
    loop {
        controller.tick();

        guard.terminal_mut().draw(|f| {
            draw_dashboard(f, controller.dashboard(), controller.fetch_state(), frame)
        })?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press
                    && controller.handle_key(key) == LoopControl::Exit
                {
                    break;
                }
            }
        }
        frame = frame.wrapping_add(1);
    }

    guard.restore()?;
    Ok(())
}

/// Render one frame of the dashboard from the selection and fetch state.
pub fn draw_dashboard(
    f: &mut Frame<'_>,
    dashboard: &DashboardState,
    fetch: &FetchState,
    frame: usize,
) {
    let theme = Theme::for_mode(dashboard.dark_mode());
    let area = f.size();
    f.render_widget(Block::default().style(theme.base()), area);

    let error = fetch.error();
    let stats = fetch.latest();

    let segments = split_vertical(
        area,
        &[
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(if error.is_some() { 3 } else { 0 }),
            Constraint::Length(if stats.is_some() { 4 } else { 0 }),
            Constraint::Min(8),
            Constraint::Length(1),
        ],
    );

    render_header(f, segments[0], dashboard, &theme);
    render_search_row(f, segments[1], dashboard, fetch.has_records(), &theme);
    if let Some(message) = error {
        render_error_banner(f, segments[2], message, &theme);
    }
    if let Some(stats) = stats {
        render_stat_cards(f, segments[3], &stats, &theme);
    }
    render_charts(f, segments[4], dashboard, fetch, frame, &theme);
    render_footer(f, segments[5], fetch, &theme);
}

fn render_header(f: &mut Frame<'_>, area: Rect, dashboard: &DashboardState, theme: &Theme) {
    let mode = if dashboard.dark_mode() {
        "dark"
    } else {
        "light"
    };
    let halves = split_horizontal(area, &[Constraint::Min(20), Constraint::Length(18)]);

    let title = Text::from(vec![
        Line::from(theme.header_span("Financial Dashboard")),
        theme.secondary_line("Visualize stock market data"),
    ]);
    f.render_widget(Paragraph::new(title).style(theme.base()), halves[0]);

    f.render_widget(
        Paragraph::new(theme.secondary_line(format!("[d] {} mode", mode)))
            .alignment(Alignment::Right)
            .style(theme.base()),
        halves[1],
    );
}

fn render_search_row(
    f: &mut Frame<'_>,
    area: Rect,
    dashboard: &DashboardState,
    has_records: bool,
    theme: &Theme,
) {
    let halves = split_horizontal(area, &[Constraint::Percentage(45), Constraint::Percentage(55)]);

    let searching = dashboard.input_mode() == InputMode::Search;
    let search_block = Block::default()
        .borders(Borders::ALL)
        .border_style(if searching {
            Style::default().fg(theme.accent)
        } else {
            theme.border_style()
        })
        .title("Search")
        .style(theme.panel());
    let inner_width = search_block.inner(halves[0]).width as usize;

    let content = if searching {
        let visible = tail_to_width(dashboard.search(), inner_width.saturating_sub(1));
        Line::from(vec![
            Span::raw(visible.to_string()),
            Span::styled("█", Style::default().fg(theme.accent)),
        ])
    } else {
        theme.secondary_line(SEARCH_PLACEHOLDER)
    };
    f.render_widget(Paragraph::new(content).block(search_block), halves[0]);

    let mut spans = Vec::new();
    for (idx, symbol) in dashboard.visible_symbols(has_records).iter().enumerate() {
        if idx > 0 {
            spans.push(Span::raw(" "));
        }
        let label = format!(" {} {} ", idx + 1, symbol);
        if *symbol == dashboard.active_symbol() {
            spans.push(Span::styled(label, theme.selection()));
        } else {
            spans.push(Span::styled(label, Style::default().fg(theme.text)));
        }
    }

    let symbols_block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style())
        .title("Symbols (←/→ or 1-9)")
        .style(theme.panel());
    f.render_widget(Paragraph::new(Line::from(spans)).block(symbols_block), halves[1]);
}

fn render_error_banner(f: &mut Frame<'_>, area: Rect, message: &str, theme: &Theme) {
    let style = Style::default().fg(theme.error_fg).bg(theme.error_bg);
    let line = Line::from(vec![
        Span::styled("Error: ", style.add_modifier(Modifier::BOLD)),
        Span::styled(message.to_string(), style),
    ]);
    f.render_widget(
        Paragraph::new(line)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).border_style(style))
            .style(style),
        area,
    );
}

fn render_stat_cards(f: &mut Frame<'_>, area: Rect, stats: &Stats, theme: &Theme) {
    let cards = [
        ("Current Price", format_price(stats.price), theme.up),
        ("Today's High", format_price(stats.high), theme.line),
        ("Today's Low", format_price(stats.low), theme.down),
        ("Volume", format_volume(stats.volume), theme.accent),
    ];
    let slots = split_horizontal(area, &[Constraint::Ratio(1, 4); 4]);

    for ((label, value, color), slot) in cards.into_iter().zip(slots) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .style(theme.panel());
        let text = Text::from(vec![
            theme.secondary_line(label),
            Line::from(Span::styled(
                value,
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
            )),
        ]);
        f.render_widget(Paragraph::new(text).block(block), slot);
    }
}

fn render_charts(
    f: &mut Frame<'_>,
    area: Rect,
    dashboard: &DashboardState,
    fetch: &FetchState,
    frame: usize,
    theme: &Theme,
) {
    let halves = if area.width >= SIDE_BY_SIDE_MIN_WIDTH {
        split_horizontal(area, &[Constraint::Percentage(50), Constraint::Percentage(50)])
    } else {
        split_vertical(area, &[Constraint::Percentage(50), Constraint::Percentage(50)])
    };
    let symbol = dashboard.active_symbol();

    if fetch.is_loading() {
        let message = format!("{} Loading {}...", SPINNER[frame % SPINNER.len()], symbol);
        render_placeholder(f, halves[0], "Line Chart", &message, theme);
        render_placeholder(f, halves[1], "Candlestick Chart", &message, theme);
    } else if fetch.has_records() {
        render_line_chart(f, halves[0], fetch.records(), symbol, theme);
        render_candlestick_chart(f, halves[1], fetch.records(), symbol, theme);
    } else {
        let message = if fetch.error().is_some() {
            "Failed to load data"
        } else {
            "No data available"
        };
        render_placeholder(f, halves[0], "Line Chart", message, theme);
        render_placeholder(f, halves[1], "Candlestick Chart", message, theme);
    }
}

fn render_footer(f: &mut Frame<'_>, area: Rect, fetch: &FetchState, theme: &Theme) {
    let mut text = String::from("/ search • ←/→ switch • r reload • d theme • q quit");
    if let Some(updated) = fetch.updated_at() {
        text.push_str(&format!(" • updated {}", format_updated_at(updated)));
    }
    f.render_widget(
        Paragraph::new(theme.secondary_line(text)).style(theme.base()),
        area,
    );
}
