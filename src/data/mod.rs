//! Core data models for wxticker
//!
//! Normalized records produced from the weather and finance APIs, plus the
//! query types used to request them.

pub mod finance;
pub mod weather;

pub use finance::{describe_error_payload, transform_finance, FinanceClient};
pub use weather::{transform_weather, WeatherClient};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// Errors raised by the fetch clients
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("{url} returned HTTP {status}")]
    Status { status: u16, url: String },

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    Parse(#[from] serde_json::Error),

    /// No API key configured for the source
    #[error("No API key configured for {0}")]
    MissingApiKey(&'static str),
}

/// Current conditions for one city, temperatures in Celsius
///
/// Every measurement is optional because the source may omit it; only the
/// observation time is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub city: Option<String>,
    pub description: Option<String>,
    pub temp_c: Option<f64>,
    pub feels_like_c: Option<f64>,
    pub temp_min_c: Option<f64>,
    pub temp_max_c: Option<f64>,
    /// Atmospheric pressure in hPa
    pub pressure: Option<i64>,
    /// Relative humidity percentage (0-100)
    pub humidity: Option<u8>,
    /// Wind speed in m/s
    pub wind_speed: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

/// Time bucket of a price bar
///
/// Daily series are keyed by date, intraday series by date and time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bucket {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Bucket {
    /// Parses `YYYY-MM-DD` or `YYYY-MM-DD HH:MM[:SS]`
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Some(Bucket::Date(date));
        }
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M"))
            .ok()
            .map(Bucket::DateTime)
    }

    /// The bucket as a date-time, dates at midnight
    pub fn as_datetime(&self) -> NaiveDateTime {
        match self {
            Bucket::Date(date) => date.and_time(chrono::NaiveTime::MIN),
            Bucket::DateTime(dt) => *dt,
        }
    }
}

impl Ord for Bucket {
    fn cmp(&self, other: &Self) -> Ordering {
        let rank = |b: &Bucket| matches!(b, Bucket::DateTime(_)) as u8;
        self.as_datetime()
            .cmp(&other.as_datetime())
            .then_with(|| rank(self).cmp(&rank(other)))
    }
}

impl PartialOrd for Bucket {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bucket::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Bucket::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M")),
        }
    }
}

/// One OHLCV bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub symbol: String,
    pub timestamp: Bucket,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Price bars for one symbol, ascending by timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Builds a series, sorting points by timestamp (stable)
    pub fn new(symbol: impl Into<String>, mut points: Vec<PricePoint>) -> Self {
        points.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Self {
            symbol: symbol.into(),
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Close prices in series order
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn latest(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// The last `n` points
    pub fn tail(&self, n: usize) -> &[PricePoint] {
        let start = self.points.len().saturating_sub(n);
        &self.points[start..]
    }
}

/// Daily or intraday price series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeriesMode {
    Daily,
    Intraday,
}

impl SeriesMode {
    /// Parses a mode name, case-insensitive
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "daily" | "d" => Some(SeriesMode::Daily),
            "intraday" | "i" => Some(SeriesMode::Intraday),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeriesMode::Daily => "daily",
            SeriesMode::Intraday => "intraday",
        }
    }

    /// The other mode
    pub fn toggled(&self) -> Self {
        match self {
            SeriesMode::Daily => SeriesMode::Intraday,
            SeriesMode::Intraday => SeriesMode::Daily,
        }
    }
}

/// How many bars the finance source returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputSize {
    /// Latest 100 bars
    Compact,
    /// Full history
    Full,
}

impl OutputSize {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "compact" => Some(OutputSize::Compact),
            "full" => Some(OutputSize::Full),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputSize::Compact => "compact",
            OutputSize::Full => "full",
        }
    }
}

/// Parameters of one price series request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FinanceQuery {
    /// Upper-case ticker symbol
    pub symbol: String,
    pub mode: SeriesMode,
    /// Bar width for intraday requests (e.g. "60min")
    pub interval: String,
    pub output_size: OutputSize,
}

impl FinanceQuery {
    /// A compact daily query for `symbol`
    pub fn daily(symbol: &str) -> Self {
        Self {
            symbol: symbol.trim().to_uppercase(),
            mode: SeriesMode::Daily,
            interval: finance::DEFAULT_INTRADAY_INTERVAL.to_string(),
            output_size: OutputSize::Compact,
        }
    }

    /// The same query in the given mode
    pub fn with_mode(mut self, mode: SeriesMode) -> Self {
        self.mode = mode;
        self
    }

    /// Composite cache key; the interval only matters for intraday
    pub fn cache_key(&self) -> String {
        match self.mode {
            SeriesMode::Daily => format!(
                "finance:{}:daily:{}",
                self.symbol,
                self.output_size.as_str()
            ),
            SeriesMode::Intraday => format!(
                "finance:{}:intraday:{}:{}",
                self.symbol,
                self.interval,
                self.output_size.as_str()
            ),
        }
    }
}

/// Cache key for a weather lookup
pub fn weather_cache_key(city: &str) -> String {
    format!("weather:{}", city.trim().to_lowercase())
}
