//! Finance screen rendering
//!
//! Headline quote, close-price sparkline, moving averages, return statistics,
//! and a table of the most recent bars.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use super::widgets::PriceSparkline;
use super::{change_color, fmt_pct, fmt_price};
use crate::analytics::{format_volume, PriceSummary, LONG_MA_WINDOW, SHORT_MA_WINDOW};
use crate::app::App;
use crate::dashboard::SeriesSnapshot;

/// Number of bars listed in the table
const RECENT_ROWS: usize = 10;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(snapshot) = app.dashboard.context().series.as_ref() else {
        let text = Paragraph::new(format!(
            "No {} data loaded for {}. Press r to fetch.",
            app.query.mode.as_str(),
            app.query.symbol
        ))
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL).title(" Finance "));
        frame.render_widget(text, area);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(0),
        ])
        .split(area);

    render_quote(frame, snapshot, rows[0]);
    render_trend(frame, snapshot, rows[1]);
    render_indicators(frame, snapshot, rows[2]);
    render_recent(frame, snapshot, rows[3]);
}

fn render_quote(frame: &mut Frame, snapshot: &SeriesSnapshot, area: Rect) {
    let title = format!(
        " {} ({}) ",
        snapshot.series.symbol,
        snapshot.query.mode.as_str()
    );
    let line = match snapshot.analysis.summary.as_ref() {
        Some(summary) => quote_line(summary),
        None => Line::from("No bars in series"),
    };

    let quote = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(Color::LightRed)),
    );
    frame.render_widget(quote, area);
}

fn quote_line(summary: &PriceSummary) -> Line<'static> {
    let color = change_color(summary.change);
    Line::from(vec![
        Span::styled(
            fmt_price(Some(summary.latest_close)),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("{:+.2} ({:+.2}%)", summary.change, summary.change_pct),
            Style::default().fg(color),
        ),
        Span::raw(format!(
            "  Open {}  High {}  Volume {}",
            fmt_price(Some(summary.latest_open)),
            fmt_price(Some(summary.latest_high)),
            format_volume(summary.latest_volume)
        )),
    ])
}

fn render_trend(frame: &mut Frame, snapshot: &SeriesSnapshot, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Close Price Trend ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let closes = snapshot.series.closes();
    let color = match (closes.first(), closes.last()) {
        (Some(first), Some(last)) => change_color(last - first),
        _ => Color::Gray,
    };
    frame.render_widget(
        PriceSparkline::new(&closes).style(Style::default().fg(color)),
        inner,
    );
}

fn render_indicators(frame: &mut Frame, snapshot: &SeriesSnapshot, area: Rect) {
    let analysis = &snapshot.analysis;
    let latest = |values: &[Option<f64>]| values.last().copied().flatten();

    let ma_line = Line::from(vec![
        label(format!("MA{}", SHORT_MA_WINDOW)),
        Span::raw(fmt_price(latest(&analysis.ma_short))),
        Span::raw("    "),
        label(format!("MA{}", LONG_MA_WINDOW)),
        Span::raw(fmt_price(latest(&analysis.ma_long))),
    ]);

    let stats_line = match analysis.return_stats {
        Some(stats) => Line::from(vec![
            label("Mean Return".to_string()),
            Span::raw(fmt_pct(Some(stats.mean))),
            Span::raw("  "),
            label("Volatility".to_string()),
            Span::raw(fmt_pct(stats.std_dev)),
            Span::raw("  "),
            label("Max".to_string()),
            Span::raw(fmt_pct(Some(stats.max))),
            Span::raw("  "),
            label("Min".to_string()),
            Span::raw(fmt_pct(Some(stats.min))),
        ]),
        None => Line::from(Span::styled(
            "Not enough bars for returns",
            Style::default().fg(Color::DarkGray),
        )),
    };

    let indicators = Paragraph::new(vec![ma_line, stats_line])
        .block(Block::default().borders(Borders::ALL).title(" Indicators "));
    frame.render_widget(indicators, area);
}

fn label(text: String) -> Span<'static> {
    Span::styled(format!("{} ", text), Style::default().fg(Color::Yellow))
}

fn render_recent(frame: &mut Frame, snapshot: &SeriesSnapshot, area: Rect) {
    let header = Row::new(["Time", "Open", "High", "Low", "Close", "Volume"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = snapshot
        .series
        .tail(RECENT_ROWS)
        .iter()
        .rev()
        .map(|p| {
            Row::new(vec![
                Cell::from(p.timestamp.to_string()),
                Cell::from(format!("{:.2}", p.open)),
                Cell::from(format!("{:.2}", p.high)),
                Cell::from(format!("{:.2}", p.low)),
                Cell::from(format!("{:.2}", p.close)),
                Cell::from(format_volume(p.volume)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(17),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Last {} Bars ", RECENT_ROWS)),
    );
    frame.render_widget(table, area);
}
