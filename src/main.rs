//! wxticker - current weather and stock prices in your terminal
//!
//! Opens a four-view TUI by default. With `--json` it loads both sources once
//! and prints the normalized data instead.

use std::io;
use std::panic;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use wxticker::app::{App, LoadRequest};
use wxticker::cache::CacheManager;
use wxticker::cli::{Cli, StartupConfig};
use wxticker::dashboard::Dashboard;
use wxticker::telemetry::{init_logging, LogTarget};
use wxticker::ui;

/// Sets up a panic hook that restores the terminal before printing the panic message.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

/// Loads weather and prices once and prints them as JSON
///
/// Fails only when neither source could be loaded.
async fn run_json(config: &StartupConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut dashboard =
        Dashboard::from_keys(config.weather_api_key.clone(), config.finance_api_key.clone());

    let mut errors = Vec::new();
    if let Err(e) = dashboard.load_weather(&config.city).await {
        tracing::error!(error = %e, "weather load failed");
        errors.push(e.to_string());
    }
    if let Err(e) = dashboard.load_series(&config.query).await {
        tracing::error!(error = %e, "series load failed");
        errors.push(e.to_string());
    }

    let context = dashboard.context();
    if context.weather.is_none() && context.series.is_none() {
        return Err(errors.join(" | ").into());
    }

    println!("{}", serde_json::to_string_pretty(context)?);
    Ok(())
}

async fn run_tui(config: &StartupConfig) -> Result<(), Box<dyn std::error::Error>> {
    setup_panic_hook();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config);
    app.request_load(LoadRequest::All { force: false });

    loop {
        terminal.draw(|f| ui::render(f, &app))?;

        if let Some(request) = app.take_pending() {
            app.loading = true;
            terminal.draw(|f| ui::render(f, &app))?;
            app.load(request).await;
            app.loading = false;
            continue;
        }

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let log_target = if config.json_output {
        LogTarget::Stderr
    } else {
        CacheManager::new()
            .map(|cache| LogTarget::file_in(cache.dir()))
            .unwrap_or(LogTarget::Off)
    };
    if let Err(e) = init_logging(&config.log_level, &log_target) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let result = if config.json_output {
        run_json(&config).await
    } else {
        run_tui(&config).await
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
