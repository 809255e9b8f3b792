//! Home screen: what each view shows and what is loaded

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let weather_card = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("Weather: {}", app.city),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Current temperature and conditions"),
        Line::from("Humidity, pressure, and wind"),
        Line::from(""),
        loaded_line(app.dashboard.context().weather.is_some()),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" 2 Weather ")
            .border_style(Style::default().fg(Color::Magenta)),
    )
    .wrap(Wrap { trim: true });

    let finance_card = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("Stock: {} ({})", app.query.symbol, app.query.mode.as_str()),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Price trend with 7 and 20 period moving averages"),
        Line::from("Daily returns and volatility"),
        Line::from(""),
        loaded_line(app.dashboard.context().series.is_some()),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" 3 Finance ")
            .border_style(Style::default().fg(Color::LightRed)),
    )
    .wrap(Wrap { trim: true });

    frame.render_widget(weather_card, columns[0]);
    frame.render_widget(finance_card, columns[1]);
}

fn loaded_line(loaded: bool) -> Line<'static> {
    if loaded {
        Line::from(Span::styled("Data loaded", Style::default().fg(Color::Green)))
    } else {
        Line::from(Span::styled(
            "No data yet, press r to fetch",
            Style::default().fg(Color::DarkGray),
        ))
    }
}
