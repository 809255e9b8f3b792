//! Combined screen: weather and finance side by side

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{fmt_pct, fmt_price, fmt_temp, title_case};
use crate::analytics::format_volume;
use crate::app::App;
use crate::dashboard::{SeriesSnapshot, WeatherSnapshot};

const RECENT_ROWS: usize = 5;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let context = app.dashboard.context();

    let weather_lines = match context.weather.as_ref() {
        Some(snapshot) => weather_lines(snapshot),
        None => vec![missing_line(&app.city)],
    };
    let weather = Paragraph::new(weather_lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Weather ")
            .border_style(Style::default().fg(Color::Magenta)),
    );
    frame.render_widget(weather, columns[0]);

    let finance_lines = match context.series.as_ref() {
        Some(snapshot) => finance_lines(snapshot),
        None => vec![missing_line(&app.query.symbol)],
    };
    let finance = Paragraph::new(finance_lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Finance ")
            .border_style(Style::default().fg(Color::LightRed)),
    );
    frame.render_widget(finance, columns[1]);
}

fn missing_line(subject: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!("No data for {}", subject),
        Style::default().fg(Color::DarkGray),
    ))
}

fn heading(text: String) -> Line<'static> {
    Line::from(Span::styled(text, Style::default().add_modifier(Modifier::BOLD)))
}

fn weather_lines(snapshot: &WeatherSnapshot) -> Vec<Line<'static>> {
    let obs = &snapshot.observation;
    vec![
        heading(obs.city.clone().unwrap_or_else(|| snapshot.city.clone())),
        Line::from(""),
        Line::from(format!("Temperature  {}", fmt_temp(obs.temp_c))),
        Line::from(format!(
            "Conditions   {}",
            title_case(obs.description.as_deref().unwrap_or("Unknown"))
        )),
        Line::from(format!(
            "Humidity     {}",
            obs.humidity
                .map(|h| format!("{}%", h))
                .unwrap_or_else(|| "--".to_string())
        )),
        Line::from(format!(
            "Wind         {}",
            obs.wind_speed
                .map(|w| format!("{:.1} m/s", w))
                .unwrap_or_else(|| "--".to_string())
        )),
    ]
}

fn finance_lines(snapshot: &SeriesSnapshot) -> Vec<Line<'static>> {
    let analysis = &snapshot.analysis;
    let summary = analysis.summary.as_ref();
    let stats = analysis.return_stats;

    let mut lines = vec![
        heading(format!(
            "{} ({})",
            snapshot.series.symbol,
            snapshot.query.mode.as_str()
        )),
        Line::from(""),
        Line::from(format!(
            "Latest Close   {}",
            fmt_price(summary.map(|s| s.latest_close))
        )),
        Line::from(format!("Records        {}", snapshot.series.len())),
        Line::from(format!(
            "Mean Return    {}",
            fmt_pct(stats.map(|s| s.mean))
        )),
        Line::from(format!(
            "Max Price      {}",
            fmt_price(summary.map(|s| s.max_high))
        )),
        Line::from(format!(
            "Volatility     {}",
            fmt_pct(stats.and_then(|s| s.std_dev))
        )),
        Line::from(""),
        heading("Recent".to_string()),
    ];

    lines.extend(snapshot.series.tail(RECENT_ROWS).iter().rev().map(|p| {
        Line::from(format!(
            "{:<17} {:>10.2} {:>10}",
            p.timestamp.to_string(),
            p.close,
            format_volume(p.volume)
        ))
    }));
    lines
}
