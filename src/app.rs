//! Application state management for wxticker
//!
//! Holds the current view, the query parameters, and the `Dashboard` service.
//! Key handling is synchronous; keys that need data queue a `LoadRequest`
//! which the main loop runs between frames.

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent};

use crate::cli::StartupConfig;
use crate::dashboard::Dashboard;
use crate::data::FinanceQuery;

/// The four dashboard views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Weather,
    Finance,
    Combined,
}

impl View {
    pub const ALL: [View; 4] = [View::Home, View::Weather, View::Finance, View::Combined];

    pub fn title(&self) -> &'static str {
        match self {
            View::Home => "Home",
            View::Weather => "Weather",
            View::Finance => "Finance",
            View::Combined => "Combined",
        }
    }

    pub fn index(&self) -> usize {
        View::ALL.iter().position(|v| v == self).unwrap_or(0)
    }

    pub fn next(&self) -> View {
        View::ALL[(self.index() + 1) % View::ALL.len()]
    }
}

/// Data a key press asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadRequest {
    Weather { force: bool },
    Finance { force: bool },
    All { force: bool },
}

impl LoadRequest {
    fn includes_weather(&self) -> bool {
        matches!(self, LoadRequest::Weather { .. } | LoadRequest::All { .. })
    }

    fn includes_finance(&self) -> bool {
        matches!(self, LoadRequest::Finance { .. } | LoadRequest::All { .. })
    }

    fn force(&self) -> bool {
        match *self {
            LoadRequest::Weather { force }
            | LoadRequest::Finance { force }
            | LoadRequest::All { force } => force,
        }
    }
}

/// Message shown in the footer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub message: String,
    pub is_error: bool,
}

/// Main application struct managing state and data
pub struct App {
    /// Current view
    pub view: View,
    /// City for the weather view
    pub city: String,
    /// Current price series query
    pub query: FinanceQuery,
    /// Clients, cache, and last loaded data
    pub dashboard: Dashboard,
    /// Outcome of the last load
    pub status: Option<StatusLine>,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Set while a load is running so the frame can say so
    pub loading: bool,
    /// Timestamp of last successful load
    pub last_refresh: Option<DateTime<Local>>,
    pending: Option<LoadRequest>,
}

impl App {
    /// Creates an App from validated startup configuration
    pub fn new(config: &StartupConfig) -> Self {
        let dashboard =
            Dashboard::from_keys(config.weather_api_key.clone(), config.finance_api_key.clone());
        Self::with_dashboard(dashboard, config.city.clone(), config.query.clone())
    }

    /// Creates an App around an existing dashboard
    pub fn with_dashboard(dashboard: Dashboard, city: String, query: FinanceQuery) -> Self {
        Self {
            view: View::Home,
            city,
            query,
            dashboard,
            status: None,
            show_help: false,
            should_quit: false,
            loading: false,
            last_refresh: None,
            pending: None,
        }
    }

    /// Queues a load to run on the next loop iteration
    pub fn request_load(&mut self, request: LoadRequest) {
        self.pending = Some(request);
    }

    /// Takes the queued load, if any
    pub fn take_pending(&mut self) -> Option<LoadRequest> {
        self.pending.take()
    }

    /// Runs one load cycle; weather first, then finance
    ///
    /// Failures are reported in `status` and never clear previously loaded data.
    pub async fn load(&mut self, request: LoadRequest) {
        let force = request.force();
        let mut loaded = Vec::new();
        let mut errors = Vec::new();

        if request.includes_weather() {
            let city = self.city.clone();
            let result = if force {
                self.dashboard.refresh_weather(&city).await
            } else {
                self.dashboard.load_weather(&city).await
            };
            match result {
                Ok(_) => loaded.push(format!("weather for {}", city)),
                Err(e) => errors.push(e.to_string()),
            }
        }

        if request.includes_finance() {
            let query = self.query.clone();
            let result = if force {
                self.dashboard.refresh_series(&query).await
            } else {
                self.dashboard.load_series(&query).await
            };
            match result {
                Ok(_) => loaded.push(format!("{} {}", query.symbol, query.mode.as_str())),
                Err(e) => errors.push(e.to_string()),
            }
        }

        if !loaded.is_empty() {
            self.last_refresh = Some(Local::now());
        }

        self.status = if !errors.is_empty() {
            Some(StatusLine {
                message: errors.join(" | "),
                is_error: true,
            })
        } else if !loaded.is_empty() {
            Some(StatusLine {
                message: format!("Loaded {}", loaded.join(", ")),
                is_error: false,
            })
        } else {
            None
        };
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `1`-`4`: Home, Weather, Finance, Combined
    /// - `Tab`: Next view
    /// - `m`: Toggle daily/intraday series
    /// - `r`: Refresh the current view, bypassing the cache
    /// - `?`: Toggle help
    /// - `Esc`: Back to Home, or quit from Home
    /// - `q`: Quit
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {}
            }
            return;
        }

        match key_event.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => {
                if self.view == View::Home {
                    self.should_quit = true;
                } else {
                    self.view = View::Home;
                }
            }
            KeyCode::Char('1') => self.view = View::Home,
            KeyCode::Char('2') => self.view = View::Weather,
            KeyCode::Char('3') => self.view = View::Finance,
            KeyCode::Char('4') => self.view = View::Combined,
            KeyCode::Tab => self.view = self.view.next(),
            KeyCode::Char('m') => {
                self.query.mode = self.query.mode.toggled();
                self.request_load(LoadRequest::Finance { force: false });
            }
            KeyCode::Char('r') => {
                let request = match self.view {
                    View::Weather => LoadRequest::Weather { force: true },
                    View::Finance => LoadRequest::Finance { force: true },
                    View::Home | View::Combined => LoadRequest::All { force: true },
                };
                self.request_load(request);
            }
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{weather_cache_key, FinanceClient, SeriesMode, WeatherClient};
    use crossterm::event::KeyModifiers;
    use serde_json::json;

    /// Helper to create a KeyEvent for testing
    fn key_event(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn offline_app() -> App {
        let dashboard = Dashboard::new(WeatherClient::new(None), FinanceClient::new(None));
        App::with_dashboard(dashboard, "London".to_string(), FinanceQuery::daily("IBM"))
    }

    #[test]
    fn test_app_starts_on_home() {
        let app = offline_app();
        assert_eq!(app.view, View::Home);
        assert!(!app.should_quit);
        assert!(app.status.is_none());
    }

    #[test]
    fn test_number_keys_switch_views() {
        let mut app = offline_app();

        app.handle_key(key_event(KeyCode::Char('2')));
        assert_eq!(app.view, View::Weather);
        app.handle_key(key_event(KeyCode::Char('3')));
        assert_eq!(app.view, View::Finance);
        app.handle_key(key_event(KeyCode::Char('4')));
        assert_eq!(app.view, View::Combined);
        app.handle_key(key_event(KeyCode::Char('1')));
        assert_eq!(app.view, View::Home);
    }

    #[test]
    fn test_tab_cycles_views() {
        let mut app = offline_app();
        for expected in [View::Weather, View::Finance, View::Combined, View::Home] {
            app.handle_key(key_event(KeyCode::Tab));
            assert_eq!(app.view, expected);
        }
    }

    #[test]
    fn test_esc_goes_home_then_quits() {
        let mut app = offline_app();
        app.view = View::Finance;

        app.handle_key(key_event(KeyCode::Esc));
        assert_eq!(app.view, View::Home);
        assert!(!app.should_quit);

        app.handle_key(key_event(KeyCode::Esc));
        assert!(app.should_quit);
    }

    #[test]
    fn test_q_quits() {
        let mut app = offline_app();
        app.view = View::Weather;
        app.handle_key(key_event(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn test_help_overlay_intercepts_keys() {
        let mut app = offline_app();
        app.handle_key(key_event(KeyCode::Char('?')));
        assert!(app.show_help);

        app.handle_key(key_event(KeyCode::Char('3')));
        assert_eq!(app.view, View::Home, "Keys are ignored while help is shown");

        app.handle_key(key_event(KeyCode::Char('q')));
        assert!(!app.show_help);
        assert!(!app.should_quit, "q closes help before quitting");
    }

    #[test]
    fn test_m_toggles_mode_and_queues_finance_load() {
        let mut app = offline_app();

        app.handle_key(key_event(KeyCode::Char('m')));

        assert_eq!(app.query.mode, SeriesMode::Intraday);
        assert_eq!(
            app.take_pending(),
            Some(LoadRequest::Finance { force: false })
        );
        assert_eq!(app.take_pending(), None);
    }

    #[test]
    fn test_r_refreshes_current_view() {
        let mut app = offline_app();

        app.view = View::Weather;
        app.handle_key(key_event(KeyCode::Char('r')));
        assert_eq!(app.take_pending(), Some(LoadRequest::Weather { force: true }));

        app.view = View::Combined;
        app.handle_key(key_event(KeyCode::Char('r')));
        assert_eq!(app.take_pending(), Some(LoadRequest::All { force: true }));
    }

    #[tokio::test]
    async fn test_load_success_sets_status_and_refresh_time() {
        let mut app = offline_app();
        app.dashboard.cache().insert(
            weather_cache_key("London"),
            json!({"name": "London", "main": {"temp": 280.15}, "dt": 1700000000}),
        );

        app.load(LoadRequest::Weather { force: false }).await;

        let status = app.status.clone().unwrap();
        assert!(!status.is_error);
        assert!(status.message.contains("London"));
        assert!(app.last_refresh.is_some());
        assert!(app.dashboard.context().weather.is_some());
    }

    #[tokio::test]
    async fn test_load_failure_reports_error() {
        let mut app = offline_app();

        app.load(LoadRequest::All { force: false }).await;

        let status = app.status.clone().unwrap();
        assert!(status.is_error);
        assert!(status.message.contains("API key"));
        assert!(app.last_refresh.is_none());
    }
}
