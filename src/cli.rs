//! Command-line interface parsing for wxticker
//!
//! Parses CLI arguments with clap and validates them into a `StartupConfig`.
//! API keys come from flags or the environment, never from source.

use clap::Parser;
use thiserror::Error;

use crate::data::finance::INTRADAY_INTERVALS;
use crate::data::{FinanceQuery, OutputSize, SeriesMode};

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid mode: '{0}'. Valid modes: daily, intraday")]
    InvalidMode(String),

    #[error("Invalid interval: '{0}'. Valid intervals: 1min, 5min, 15min, 30min, 60min")]
    InvalidInterval(String),

    #[error("Invalid output size: '{0}'. Valid sizes: compact, full")]
    InvalidOutputSize(String),

    #[error("Stock symbol must not be empty")]
    EmptySymbol,
}

/// wxticker - current weather and stock prices in your terminal
#[derive(Parser, Debug)]
#[command(name = "wxticker")]
#[command(about = "Current weather and stock price dashboard")]
#[command(version)]
pub struct Cli {
    /// City for the weather view (e.g. "Tokyo" or "Berlin,DE")
    #[arg(long, default_value = "London")]
    pub city: String,

    /// Stock ticker symbol for the finance view
    #[arg(long, default_value = "AAPL")]
    pub symbol: String,

    /// Price series mode: daily or intraday
    #[arg(long, default_value = "daily", value_name = "MODE")]
    pub mode: String,

    /// Bar width for intraday series: 1min, 5min, 15min, 30min, 60min
    #[arg(long, default_value = "60min")]
    pub interval: String,

    /// How many bars to request: compact (latest 100) or full
    #[arg(long, default_value = "compact", value_name = "SIZE")]
    pub outputsize: String,

    /// OpenWeatherMap API key
    #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
    pub weather_api_key: Option<String>,

    /// Alpha Vantage API key
    #[arg(long, env = "ALPHAVANTAGE_API_KEY", hide_env_values = true)]
    pub finance_api_key: Option<String>,

    /// Print normalized weather and price data as JSON and exit
    #[arg(long)]
    pub json: bool,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info", value_name = "LEVEL")]
    pub log_level: String,
}

/// Validated configuration for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub city: String,
    pub query: FinanceQuery,
    pub weather_api_key: Option<String>,
    pub finance_api_key: Option<String>,
    /// Run once and print JSON instead of opening the TUI
    pub json_output: bool,
    pub log_level: String,
}

/// Parses a series mode argument
pub fn parse_mode_arg(s: &str) -> Result<SeriesMode, CliError> {
    SeriesMode::parse(s).ok_or_else(|| CliError::InvalidMode(s.to_string()))
}

/// Checks an intraday interval against the supported bar widths
pub fn parse_interval_arg(s: &str) -> Result<String, CliError> {
    let interval = s.trim().to_lowercase();
    if INTRADAY_INTERVALS.contains(&interval.as_str()) {
        Ok(interval)
    } else {
        Err(CliError::InvalidInterval(s.to_string()))
    }
}

/// Parses an output size argument
pub fn parse_outputsize_arg(s: &str) -> Result<OutputSize, CliError> {
    OutputSize::parse(s).ok_or_else(|| CliError::InvalidOutputSize(s.to_string()))
}

/// Treats blank keys as absent
fn non_blank(key: &Option<String>) -> Option<String> {
    key.as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with normalized settings
    /// * `Err(CliError)` if a mode, interval, output size, or symbol is invalid
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let symbol = cli.symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(CliError::EmptySymbol);
        }

        let query = FinanceQuery {
            symbol,
            mode: parse_mode_arg(&cli.mode)?,
            interval: parse_interval_arg(&cli.interval)?,
            output_size: parse_outputsize_arg(&cli.outputsize)?,
        };

        Ok(StartupConfig {
            city: cli.city.trim().to_string(),
            query,
            weather_api_key: non_blank(&cli.weather_api_key),
            finance_api_key: non_blank(&cli.finance_api_key),
            json_output: cli.json,
            log_level: cli.log_level.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mode_arg() {
        assert_eq!(parse_mode_arg("daily").unwrap(), SeriesMode::Daily);
        assert_eq!(parse_mode_arg("Intraday").unwrap(), SeriesMode::Intraday);

        let err = parse_mode_arg("weekly").unwrap_err();
        assert!(err.to_string().contains("Invalid mode"));
        assert!(err.to_string().contains("weekly"));
    }

    #[test]
    fn test_parse_interval_arg() {
        assert_eq!(parse_interval_arg("5min").unwrap(), "5min");
        assert_eq!(parse_interval_arg("60MIN").unwrap(), "60min");
        assert!(parse_interval_arg("2min").is_err());
    }

    #[test]
    fn test_parse_outputsize_arg() {
        assert_eq!(parse_outputsize_arg("full").unwrap(), OutputSize::Full);
        assert!(parse_outputsize_arg("tiny").is_err());
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["wxticker"]);
        assert_eq!(cli.city, "London");
        assert_eq!(cli.symbol, "AAPL");
        assert_eq!(cli.mode, "daily");
        assert_eq!(cli.interval, "60min");
        assert!(!cli.json);
    }

    #[test]
    fn test_startup_config_normalizes_symbol() {
        let cli = Cli::parse_from(["wxticker", "--symbol", " tsla ", "--mode", "intraday"]);
        let config = StartupConfig::from_cli(&cli).unwrap();

        assert_eq!(config.query.symbol, "TSLA");
        assert_eq!(config.query.mode, SeriesMode::Intraday);
        assert_eq!(config.query.interval, "60min");
        assert_eq!(config.query.output_size, OutputSize::Compact);
    }

    #[test]
    fn test_startup_config_keys_from_flags() {
        let cli = Cli::parse_from([
            "wxticker",
            "--weather-api-key",
            "abc",
            "--finance-api-key",
            "  ",
        ]);
        let config = StartupConfig::from_cli(&cli).unwrap();

        assert_eq!(config.weather_api_key.as_deref(), Some("abc"));
        assert_eq!(config.finance_api_key, None, "Blank key counts as missing");
    }

    #[test]
    fn test_startup_config_json_flag() {
        let cli = Cli::parse_from(["wxticker", "--json", "--city", "Berlin"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert!(config.json_output);
        assert_eq!(config.city, "Berlin");
    }

    #[test]
    fn test_startup_config_rejects_invalid_values() {
        let cli = Cli::parse_from(["wxticker", "--mode", "weekly"]);
        assert!(matches!(
            StartupConfig::from_cli(&cli),
            Err(CliError::InvalidMode(_))
        ));

        let cli = Cli::parse_from(["wxticker", "--interval", "3min"]);
        assert!(matches!(
            StartupConfig::from_cli(&cli),
            Err(CliError::InvalidInterval(_))
        ));

        let cli = Cli::parse_from(["wxticker", "--symbol", " "]);
        assert!(matches!(
            StartupConfig::from_cli(&cli),
            Err(CliError::EmptySymbol)
        ));
    }
}
