//! UI rendering module for wxticker
//!
//! Every frame is a header with view tabs, the body of the current view, and a
//! footer with the last status message. Views only read from `App`.

pub mod combined;
pub mod finance;
pub mod help_overlay;
pub mod home;
pub mod weather;
pub mod widgets;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};

/// Renders the whole frame for the current state
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_tabs(frame, app, chunks[0]);

    match app.view {
        View::Home => home::render(frame, app, chunks[1]),
        View::Weather => weather::render(frame, app, chunks[1]),
        View::Finance => finance::render(frame, app, chunks[1]),
        View::Combined => combined::render(frame, app, chunks[1]),
    }

    render_footer(frame, app, chunks[2]);

    if app.show_help {
        help_overlay::render(frame);
    }
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<String> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, view)| format!("{} {}", i + 1, view.title()))
        .collect();

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Weather & Finance Dashboard "),
        )
        .select(app.view.index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let line = if app.loading {
        Line::from(Span::styled(
            "Fetching data...",
            Style::default().fg(Color::Cyan),
        ))
    } else if let Some(ref status) = app.status {
        let color = if status.is_error { Color::Red } else { Color::Green };
        Line::from(Span::styled(status.message.clone(), Style::default().fg(color)))
    } else {
        Line::from(Span::styled(
            "Press ? for help",
            Style::default().fg(Color::DarkGray),
        ))
    };

    frame.render_widget(Paragraph::new(line), area);
}

/// Formats an optional Celsius value
pub fn fmt_temp(value: Option<f64>) -> String {
    value
        .map(|t| format!("{:.1}°C", t))
        .unwrap_or_else(|| "--".to_string())
}

/// Formats an optional price with a dollar sign
pub fn fmt_price(value: Option<f64>) -> String {
    value
        .map(|p| format!("${:.2}", p))
        .unwrap_or_else(|| "--".to_string())
}

/// Formats an optional percentage with four decimals
pub fn fmt_pct(value: Option<f64>) -> String {
    value
        .map(|p| format!("{:.4}%", p))
        .unwrap_or_else(|| "--".to_string())
}

/// Capitalizes each word ("clear sky" -> "Clear Sky")
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Color for temperature (warmer = more red, cooler = more blue)
pub fn temperature_color(temp: f64) -> Color {
    if temp >= 35.0 {
        Color::Red
    } else if temp >= 25.0 {
        Color::LightRed
    } else if temp >= 15.0 {
        Color::Yellow
    } else if temp >= 0.0 {
        Color::Cyan
    } else {
        Color::Blue
    }
}

/// Green for gains, red for losses
pub fn change_color(change: f64) -> Color {
    if change > 0.0 {
        Color::Green
    } else if change < 0.0 {
        Color::Red
    } else {
        Color::Gray
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use ratatui::{backend::TestBackend, Terminal};
    use serde_json::json;

    use crate::app::App;
    use crate::dashboard::Dashboard;
    use crate::data::{weather_cache_key, FinanceClient, FinanceQuery, WeatherClient};

    /// Renders `app` into an 100x30 buffer and returns its text
    pub fn render_to_string(app: &App) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| super::render(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    pub fn empty_app() -> App {
        let dashboard = Dashboard::new(WeatherClient::new(None), FinanceClient::new(None));
        App::with_dashboard(dashboard, "London".to_string(), FinanceQuery::daily("IBM"))
    }

    /// App with London weather and a 25-day IBM series loaded from the cache
    pub async fn loaded_app() -> App {
        let mut app = empty_app();

        app.dashboard.cache().insert(
            weather_cache_key("London"),
            json!({
                "name": "London",
                "weather": [{"description": "clear sky"}],
                "main": {"temp": 290.15, "feels_like": 289.0, "temp_min": 288.0,
                         "temp_max": 292.0, "pressure": 1012, "humidity": 60},
                "wind": {"speed": 3.5},
                "dt": 1700000000
            }),
        );

        let mut bars = serde_json::Map::new();
        for day in 1..=25 {
            let close = 100.0 + day as f64;
            bars.insert(
                format!("2024-01-{:02}", day),
                json!({
                    "1. open": format!("{}", close - 0.5),
                    "2. high": format!("{}", close + 1.0),
                    "3. low": format!("{}", close - 1.0),
                    "4. close": format!("{}", close),
                    "5. volume": "2500000"
                }),
            );
        }
        app.dashboard.cache().insert(
            app.query.cache_key(),
            json!({"Meta Data": {}, "Time Series (Daily)": bars}),
        );

        app.load(crate::app::LoadRequest::All { force: false }).await;
        app
    }
}
