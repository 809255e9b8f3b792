//! Alpha Vantage time-series client
//!
//! The client returns the raw JSON body. Alpha Vantage answers rate-limit and
//! bad-symbol requests with HTTP 200 and a `Note` / `Error Message` body, so a
//! successful fetch does not imply a usable series; `transform_finance`
//! decides that.

use reqwest::Client;
use serde_json::{Map, Value};

use super::{Bucket, FetchError, FinanceQuery, PricePoint, PriceSeries, SeriesMode};

/// Base URL for the Alpha Vantage query endpoint
const ALPHA_VANTAGE_BASE_URL: &str = "https://www.alphavantage.co/query";

/// Bar width used for intraday requests unless overridden
pub const DEFAULT_INTRADAY_INTERVAL: &str = "60min";

/// Bar widths the intraday endpoint accepts
pub const INTRADAY_INTERVALS: [&str; 5] = ["1min", "5min", "15min", "30min", "60min"];

/// Substring identifying the series key, e.g. "Time Series (Daily)"
const TIME_SERIES_MARKER: &str = "Time Series";

/// Body keys Alpha Vantage uses for throttling and error messages
const ERROR_PAYLOAD_KEYS: [&str; 3] = ["Error Message", "Note", "Information"];

/// Client for fetching price series from Alpha Vantage
#[derive(Debug, Clone)]
pub struct FinanceClient {
    http_client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl FinanceClient {
    /// Create a new FinanceClient using the given API key
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key,
            base_url: ALPHA_VANTAGE_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Query-string parameters for `query`, without the API key
    fn query_params(query: &FinanceQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("function", function_name(query.mode).to_string()),
            ("symbol", query.symbol.clone()),
        ];
        if query.mode == SeriesMode::Intraday {
            params.push(("interval", query.interval.clone()));
        }
        params.push(("outputsize", query.output_size.as_str().to_string()));
        params
    }

    /// Fetch the raw time-series payload for a query
    ///
    /// # Returns
    /// * `Ok(Value)` - The JSON body, which may still be an error payload
    /// * `Err(FetchError)` - If no key is configured, the request fails, or
    ///   the server answers with an error status
    pub async fn fetch_series(&self, query: &FinanceQuery) -> Result<Value, FetchError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(FetchError::MissingApiKey("Alpha Vantage"))?;

        tracing::info!(
            symbol = %query.symbol,
            mode = query.mode.as_str(),
            "fetching price series"
        );

        let mut params = Self::query_params(query);
        params.push(("apikey", api_key.to_string()));

        let response = self
            .http_client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: self.base_url.clone(),
            });
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Alpha Vantage `function` parameter for a mode
fn function_name(mode: SeriesMode) -> &'static str {
    match mode {
        SeriesMode::Daily => "TIME_SERIES_DAILY",
        SeriesMode::Intraday => "TIME_SERIES_INTRADAY",
    }
}

/// 2^64; volumes at or above it do not fit a `u64`
const VOLUME_LIMIT: f64 = 18_446_744_073_709_551_616.0;

/// Parses a numeric field that Alpha Vantage sends as a string
///
/// A missing field reads as 0. A present value must be a finite,
/// non-negative number; anything else is an error.
fn numeric_field(bar: &Map<String, Value>, label: &str) -> Option<f64> {
    let value = match bar.get(label) {
        None => return Some(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok()?,
        Some(Value::Number(n)) => n.as_f64()?,
        Some(_) => return None,
    };
    (value.is_finite() && value >= 0.0).then_some(value)
}

fn parse_point(symbol: &str, timestamp: &str, bar: &Value) -> Option<PricePoint> {
    let bar = bar.as_object()?;
    let timestamp = Bucket::parse(timestamp)?;

    // Volume may carry a decimal point; truncate toward zero
    let volume = numeric_field(bar, "5. volume")?.trunc();
    if volume >= VOLUME_LIMIT {
        return None;
    }

    Some(PricePoint {
        symbol: symbol.to_string(),
        timestamp,
        open: numeric_field(bar, "1. open")?,
        high: numeric_field(bar, "2. high")?,
        low: numeric_field(bar, "3. low")?,
        close: numeric_field(bar, "4. close")?,
        volume: volume as u64,
    })
}

/// Normalize an Alpha Vantage payload into a `PriceSeries`
///
/// Returns `None` when the payload is absent or has no "Time Series" key,
/// which is how throttled and invalid-symbol responses look. A bar with an
/// unparseable timestamp, or a number that is negative, NaN, or infinite,
/// also rejects the payload. Missing OHLCV sub-keys default to 0.
///
/// JSON objects cannot hold duplicate keys once parsed (the last one wins), so
/// every timestamp in the result is unique.
pub fn transform_finance(raw: Option<&Value>, symbol: &str) -> Option<PriceSeries> {
    let obj = raw?.as_object()?;

    let Some(series) = obj
        .iter()
        .find(|(key, _)| key.contains(TIME_SERIES_MARKER))
        .map(|(_, value)| value)
    else {
        tracing::debug!(symbol, "no time series key in finance payload");
        return None;
    };

    let entries = series.as_object()?;
    let mut points = Vec::with_capacity(entries.len());
    for (timestamp, bar) in entries {
        match parse_point(symbol, timestamp, bar) {
            Some(point) => points.push(point),
            None => {
                tracing::warn!(symbol, timestamp = %timestamp, "unparseable price bar");
                return None;
            }
        }
    }

    Some(PriceSeries::new(symbol, points))
}

/// The provider's explanation when a payload carries no series
pub fn describe_error_payload(raw: &Value) -> Option<String> {
    let obj = raw.as_object()?;
    ERROR_PAYLOAD_KEYS
        .iter()
        .find_map(|key| obj.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}
