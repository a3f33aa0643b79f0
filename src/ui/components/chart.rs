use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Line as CanvasLine, Rectangle},
        Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Wrap,
    },
};

use crate::fetch::DailyBar;
use crate::ui::styles::Theme;

const BODY_EPSILON: f64 = 1e-4;
const DATE_LABEL_FMT: &str = "%Y-%m-%d";
const DATE_LABEL_FMT_SHORT: &str = "%m-%d";
const PRICE_PADDING_RATIO: f64 = 0.05;

fn panel_block<'a>(title: String, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style())
        .title(Span::styled(title, Style::default().fg(theme.text).bold()))
        .style(theme.panel())
}

/// Centered message inside a chart frame (loading, empty, failed).
pub fn render_placeholder(f: &mut Frame<'_>, area: Rect, title: &str, message: &str, theme: &Theme) {
    let block = panel_block(title.to_string(), theme);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let top_pad = inner.height.saturating_sub(1) / 2;
    let mut lines = vec![Line::default(); top_pad as usize];
    lines.push(theme.secondary_line(message.to_string()));

    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .style(theme.panel()),
        inner,
    );
}

/// Closing-price line chart with date labels along the x axis.
pub fn render_line_chart(
    f: &mut Frame<'_>,
    area: Rect,
    bars: &[DailyBar],
    symbol: &str,
    theme: &Theme,
) {
    if bars.is_empty() {
        render_placeholder(f, area, "Line Chart", "Loading chart data...", theme);
        return;
    }

    let points: Vec<(f64, f64)> = bars
        .iter()
        .enumerate()
        .map(|(idx, bar)| (idx as f64, bar.close))
        .collect();
    let (y_min, y_max) = padded_bounds(bars.iter().map(|bar| bar.close));
    let x_max = bars.len().saturating_sub(1).max(1) as f64;

    let label_style = Style::default().fg(theme.muted);
    let x_labels = evenly_spaced_indices(bars.len(), 3)
        .into_iter()
        .map(|idx| {
            Span::styled(
                bars[idx].date.format(DATE_LABEL_FMT_SHORT).to_string(),
                label_style,
            )
        })
        .collect::<Vec<_>>();
    let y_labels = compute_price_ticks(y_min, y_max, 5)
        .into_iter()
        .map(|value| Span::styled(format!("{:.2}", value), label_style))
        .collect::<Vec<_>>();

    let dataset = Dataset::default()
        .name(format!("{} Closing Price", symbol))
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(theme.line))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(panel_block(format!("{} Closing Prices", symbol), theme))
        .style(theme.panel())
        .x_axis(
            Axis::default()
                .style(theme.border_style())
                .bounds([0.0, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(theme.border_style())
                .bounds([y_min, y_max])
                .labels(y_labels),
        );

    f.render_widget(chart, area);
}

/// OHLC candlesticks drawn on a canvas: wick from low to high, body between
/// open and close, coloured by direction.
pub fn render_candlestick_chart(
    f: &mut Frame<'_>,
    area: Rect,
    bars: &[DailyBar],
    symbol: &str,
    theme: &Theme,
) {
    if bars.is_empty() {
        render_placeholder(
            f,
            area,
            "Candlestick Chart",
            "No data available for candlestick chart",
            theme,
        );
        return;
    }

    let block = panel_block(format!("{} Price", symbol), theme);
    let inner = block.inner(area);

    let (y_min, y_max) = padded_bounds(bars.iter().flat_map(|bar| [bar.low, bar.high]));
    let series_len = bars.len().max(1);
    let width_px = inner.width.max(1) as f64;
    let height_px = inner.height.max(1) as f64;

    let left_margin = 9.0;
    let right_margin = 1.0;
    let top_margin = 0.5;
    let bottom_margin = 1.0;

    let axis_x = left_margin;
    let available_width = (width_px - left_margin - right_margin).max(1.0);
    let x_scale = if series_len > 1 {
        available_width / (series_len.saturating_sub(1) as f64)
    } else {
        0.0
    };
    let base_width = if series_len > 1 {
        x_scale
    } else {
        available_width
    };
    let half_body = (base_width * 0.35).clamp(0.03, 0.3);
    let half_wick = half_body.min(0.2).max(0.03);
    let axis_x_end = axis_x + available_width;

    let axis_y = bottom_margin;
    let available_height = (height_px - bottom_margin - top_margin).max(1.0);
    let price_range = (y_max - y_min).max(0.01);
    let price_scale = available_height / price_range;
    let axis_y_top = axis_y + available_height;

    let price_label_x = 0.0;
    let label_style = Style::default().fg(theme.muted);
    let price_ticks: Vec<(f64, String)> = compute_price_ticks(y_min, y_max, 5)
        .into_iter()
        .map(|value| (value, format!("{:.2}", value)))
        .collect();
    let date_ticks: Vec<(f64, String)> = compute_date_ticks(bars, 4)
        .into_iter()
        .map(|(idx, label)| (axis_x + idx as f64 * x_scale, label))
        .collect();

    let candles: Vec<(f64, f64, f64, f64, Color)> = bars
        .iter()
        .map(|bar| {
            (
                bar.open,
                bar.high,
                bar.low,
                bar.close,
                candle_color(bar, theme),
            )
        })
        .collect();
    let axis_color = theme.border;

    let canvas = Canvas::default()
        .block(block)
        .background_color(theme.surface)
        .marker(Marker::HalfBlock)
        .x_bounds([0.0, width_px])
        .y_bounds([-1.0, height_px])
        .paint(move |ctx| {
            for (idx, (open, high, low, close, color)) in candles.iter().enumerate() {
                let x = axis_x + (idx as f64) * x_scale;
                let low = axis_y + (low - y_min) * price_scale;
                let high = axis_y + (high - y_min) * price_scale;
                let open = axis_y + (open - y_min) * price_scale;
                let close = axis_y + (close - y_min) * price_scale;

                ctx.draw(&CanvasLine {
                    x1: x,
                    y1: low,
                    x2: x,
                    y2: high,
                    color: *color,
                });

                let body_top = open.max(close);
                let body_bottom = open.min(close);
                if (body_top - body_bottom).abs() < BODY_EPSILON {
                    ctx.draw(&CanvasLine {
                        x1: x - half_wick,
                        y1: body_top,
                        x2: x + half_wick,
                        y2: body_top,
                        color: *color,
                    });
                } else {
                    ctx.draw(&Rectangle {
                        x: x - half_body,
                        y: body_bottom,
                        width: half_body * 2.0,
                        height: body_top - body_bottom,
                        color: *color,
                    });
                }
            }

            ctx.layer();
            ctx.draw(&CanvasLine {
                x1: axis_x,
                y1: axis_y,
                x2: axis_x_end,
                y2: axis_y,
                color: axis_color,
            });
            ctx.draw(&CanvasLine {
                x1: axis_x,
                y1: axis_y,
                x2: axis_x,
                y2: axis_y_top,
                color: axis_color,
            });

            for (value, label) in price_ticks.iter() {
                let coord = axis_y + (value - y_min) * price_scale;
                if coord < axis_y - 0.001 || coord > axis_y_top + 0.001 {
                    continue;
                }
                ctx.print(price_label_x, coord, Span::styled(label.clone(), label_style));
            }

            for (x_pos, label) in date_ticks.iter() {
                ctx.print(*x_pos, -1.0, Span::styled(label.clone(), label_style));
            }
        });

    f.render_widget(canvas, area);
}

pub fn candle_color(bar: &DailyBar, theme: &Theme) -> Color {
    if bar.is_up() {
        theme.up
    } else if bar.is_down() {
        theme.down
    } else {
        theme.unchanged
    }
}

/// Min/max of `values` widened by a small margin so lines don't hug the frame.
fn padded_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values
        .filter(|value| value.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), value| {
            (lo.min(value), hi.max(value))
        });

    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }

    let span = max - min;
    let pad = if span.abs() < 1e-9 {
        (min.abs() * PRICE_PADDING_RATIO).max(0.5)
    } else {
        span * PRICE_PADDING_RATIO
    };
    (min - pad, max + pad)
}

fn evenly_spaced_indices(len: usize, desired: usize) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }
    let last_index = len - 1;
    if last_index == 0 {
        return vec![0];
    }

    let desired = desired.max(2).min(len);
    let step = (last_index as f64) / (desired.saturating_sub(1) as f64);
    let mut indices: Vec<usize> = (0..desired)
        .map(|i| ((i as f64 * step).round() as usize).min(last_index))
        .collect();
    indices.dedup();
    indices
}

fn compute_price_ticks(min: f64, max: f64, desired: usize) -> Vec<f64> {
    let desired = desired.max(2);
    if !min.is_finite() || !max.is_finite() {
        return vec![0.0, 1.0];
    }

    let mut effective_min = min;
    let mut effective_max = max.max(effective_min + f64::EPSILON);

    if (effective_max - effective_min).abs() < 1e-6 {
        let span = if effective_min.abs() < 1.0 {
            1.0
        } else {
            effective_min.abs() * 0.05
        };
        effective_min -= span / 2.0;
        effective_max += span / 2.0;
    }

    let step = (effective_max - effective_min) / (desired as f64 - 1.0);
    (0..desired)
        .map(|i| effective_min + step * i as f64)
        .collect()
}

fn compute_date_ticks(bars: &[DailyBar], desired: usize) -> Vec<(usize, String)> {
    evenly_spaced_indices(bars.len(), desired)
        .into_iter()
        .map(|idx| {
            let format = if idx == 0 {
                DATE_LABEL_FMT
            } else {
                DATE_LABEL_FMT_SHORT
            };
            (idx, bars[idx].date.format(format).to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ratatui::backend::TestBackend;

    fn bar(day: u32, open: f64, close: f64) -> DailyBar {
        DailyBar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open,
            high: open.max(close) + 1.0,
            low: open.min(close) - 1.0,
            close,
            volume: 10,
        }
    }

    fn sample() -> Vec<DailyBar> {
        vec![
            bar(5, 100.0, 102.0),
            bar(8, 102.0, 101.0),
            bar(9, 101.0, 101.0),
            bar(10, 101.0, 105.0),
        ]
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn colours_candles_by_direction() {
        let theme = Theme::dark();
        let bars = sample();
        assert_eq!(candle_color(&bars[0], &theme), theme.up);
        assert_eq!(candle_color(&bars[1], &theme), theme.down);
        assert_eq!(candle_color(&bars[2], &theme), theme.unchanged);
    }

    #[test]
    fn pads_bounds_and_handles_flat_series() {
        let (lo, hi) = padded_bounds([10.0, 20.0].into_iter());
        assert!(lo < 10.0 && hi > 20.0);

        let (lo, hi) = padded_bounds([5.0, 5.0].into_iter());
        assert!(lo < 5.0 && hi > 5.0);

        assert_eq!(padded_bounds(std::iter::empty()), (0.0, 1.0));
    }

    #[test]
    fn spaces_indices_including_ends() {
        assert_eq!(evenly_spaced_indices(30, 3), vec![0, 15, 29]);
        assert_eq!(evenly_spaced_indices(1, 4), vec![0]);
        assert_eq!(evenly_spaced_indices(2, 4), vec![0, 1]);
        assert!(evenly_spaced_indices(0, 3).is_empty());
    }

    #[test]
    fn price_ticks_span_range() {
        let ticks = compute_price_ticks(10.0, 20.0, 5);
        assert_eq!(ticks.len(), 5);
        assert!((ticks[0] - 10.0).abs() < 1e-9);
        assert!((ticks[4] - 20.0).abs() < 1e-9);
    }

    #[test]
    fn date_ticks_label_first_in_full() {
        let ticks = compute_date_ticks(&sample(), 4);
        assert_eq!(ticks.first().unwrap(), &(0, "2024-01-05".to_string()));
        assert_eq!(ticks.last().unwrap(), &(3, "01-10".to_string()));
    }

    #[test]
    fn renders_both_charts() {
        let theme = Theme::light();
        let bars = sample();
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();

        terminal
            .draw(|f| {
                let halves = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                    .split(f.size());
                render_line_chart(f, halves[0], &bars, "IBM", &theme);
                render_candlestick_chart(f, halves[1], &bars, "IBM", &theme);
            })
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("IBM Closing Prices"));
        assert!(text.contains("IBM Price"));
    }

    #[test]
    fn empty_series_renders_placeholders() {
        let theme = Theme::dark();
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();

        terminal
            .draw(|f| render_candlestick_chart(f, f.size(), &[], "IBM", &theme))
            .unwrap();

        assert!(buffer_text(&terminal).contains("No data available"));
    }
}
