//! Weather screen rendering
//!
//! Shows the last loaded observation: temperature card on the left, detailed
//! metrics and humidity/wind gauges on the right.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use super::{fmt_temp, temperature_color, title_case};
use crate::app::App;
use crate::dashboard::WeatherSnapshot;

/// Upper end of the wind gauge in m/s
const WIND_GAUGE_MAX: f64 = 25.0;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(snapshot) = app.dashboard.context().weather.as_ref() else {
        render_empty(frame, &app.city, area);
        return;
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    render_card(frame, snapshot, columns[0]);
    render_details(frame, snapshot, columns[1]);
}

fn render_empty(frame: &mut Frame, city: &str, area: Rect) {
    let text = Paragraph::new(format!("No weather loaded for {}. Press r to fetch.", city))
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" Weather "));
    frame.render_widget(text, area);
}

fn render_card(frame: &mut Frame, snapshot: &WeatherSnapshot, area: Rect) {
    let obs = &snapshot.observation;
    let temp_style = obs
        .temp_c
        .map(|t| Style::default().fg(temperature_color(t)))
        .unwrap_or_default()
        .add_modifier(Modifier::BOLD);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(fmt_temp(obs.temp_c), temp_style)),
        Line::from(title_case(obs.description.as_deref().unwrap_or("Unknown"))),
        Line::from(Span::styled(
            format!("Feels like {}", fmt_temp(obs.feels_like_c)),
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("Observed {}", obs.timestamp.format("%Y-%m-%d %H:%M UTC")),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let title = obs.city.as_deref().unwrap_or(&snapshot.city);
    let card = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Current Weather in {} ", title))
                .border_style(Style::default().fg(Color::Magenta)),
        );
    frame.render_widget(card, area);
}

fn render_details(frame: &mut Frame, snapshot: &WeatherSnapshot, area: Rect) {
    let obs = &snapshot.observation;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    let metrics = Paragraph::new(vec![
        metric_line("Min Temp", fmt_temp(obs.temp_min_c)),
        metric_line("Max Temp", fmt_temp(obs.temp_max_c)),
        metric_line(
            "Pressure",
            obs.pressure
                .map(|p| format!("{} hPa", p))
                .unwrap_or_else(|| "--".to_string()),
        ),
    ])
    .block(Block::default().borders(Borders::ALL).title(" Details "));
    frame.render_widget(metrics, rows[0]);

    let humidity = obs.humidity.unwrap_or(0);
    let humidity_gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" Humidity "))
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(f64::from(humidity.min(100)) / 100.0)
        .label(
            obs.humidity
                .map(|h| format!("{}%", h))
                .unwrap_or_else(|| "--".to_string()),
        );
    frame.render_widget(humidity_gauge, rows[1]);

    let wind = obs.wind_speed.unwrap_or(0.0).max(0.0);
    let wind_gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" Wind Speed "))
        .gauge_style(Style::default().fg(Color::LightRed))
        .ratio((wind / WIND_GAUGE_MAX).clamp(0.0, 1.0))
        .label(
            obs.wind_speed
                .map(|w| format!("{:.1} m/s", w))
                .unwrap_or_else(|| "--".to_string()),
        );
    frame.render_widget(wind_gauge, rows[2]);
}

fn metric_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<10}", label), Style::default().fg(Color::Yellow)),
        Span::raw(value),
    ])
}

#[cfg(test)]
mod tests {
    use crate::app::View;
    use crate::ui::test_support::*;

    #[test]
    fn test_weather_view_without_data() {
        let mut app = empty_app();
        app.view = View::Weather;

        let content = render_to_string(&app);
        assert!(content.contains("No weather loaded for London"));
    }

    #[tokio::test]
    async fn test_weather_view_shows_observation() {
        let mut app = loaded_app().await;
        app.view = View::Weather;

        let content = render_to_string(&app);
        assert!(content.contains("Current Weather in London"));
        assert!(content.contains("17.0°C"));
        assert!(content.contains("Clear Sky"));
        assert!(content.contains("1012 hPa"));
        assert!(content.contains("60%"));
        assert!(content.contains("3.5 m/s"));
    }
}
