//! Fetch, cache, and transform cycle behind every dashboard action
//!
//! `Dashboard` owns the API clients, the response cache, and the
//! `DashboardContext` holding the last successfully loaded observation and
//! series. A failed load leaves the context untouched, so the views keep
//! showing the previous data alongside the error.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::analytics::SeriesAnalysis;
use crate::cache::{CacheManager, ResponseCache};
use crate::data::{
    describe_error_payload, transform_finance, transform_weather, weather_cache_key,
    FetchError, FinanceClient, FinanceQuery, PriceSeries, WeatherClient, WeatherObservation,
};

/// How long a fetched payload is reused by the dashboard (5 minutes)
pub const DASHBOARD_TTL_SECS: i64 = 300;

/// Errors from one load cycle
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Blank city or symbol
    #[error("Please enter a {0}")]
    EmptyQuery(&'static str),

    /// Weather payload lacked required fields
    #[error("Could not read weather data for {city}")]
    MalformedWeather { city: String },

    /// Finance payload had no time series
    #[error(
        "No time series data for {symbol}: {}",
        .reason.as_deref().unwrap_or("unexpected response")
    )]
    NoSeries {
        symbol: String,
        reason: Option<String>,
    },
}

/// Last loaded weather
#[derive(Debug, Clone, Serialize)]
pub struct WeatherSnapshot {
    /// City as the user typed it
    pub city: String,
    pub observation: WeatherObservation,
    pub loaded_at: DateTime<Utc>,
}

/// Last loaded price series and its derived metrics
#[derive(Debug, Clone, Serialize)]
pub struct SeriesSnapshot {
    pub query: FinanceQuery,
    pub series: PriceSeries,
    pub analysis: SeriesAnalysis,
    pub loaded_at: DateTime<Utc>,
}

/// What the views render from
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardContext {
    pub weather: Option<WeatherSnapshot>,
    pub series: Option<SeriesSnapshot>,
}

/// Dashboard service
#[derive(Debug)]
pub struct Dashboard {
    weather_client: WeatherClient,
    finance_client: FinanceClient,
    cache: ResponseCache<Value>,
    ttl: Duration,
    context: DashboardContext,
}

impl Dashboard {
    /// Creates a dashboard with the given clients and the default TTL
    pub fn new(weather_client: WeatherClient, finance_client: FinanceClient) -> Self {
        Self {
            weather_client,
            finance_client,
            cache: ResponseCache::new(),
            ttl: Duration::seconds(DASHBOARD_TTL_SECS),
            context: DashboardContext::default(),
        }
    }

    /// Builds the clients from API keys, with a disk cache for weather when available
    pub fn from_keys(weather_api_key: Option<String>, finance_api_key: Option<String>) -> Self {
        let mut weather_client = WeatherClient::new(weather_api_key);
        if let Some(cache_manager) = CacheManager::new() {
            weather_client = weather_client.with_cache(cache_manager);
        }
        Self::new(weather_client, FinanceClient::new(finance_api_key))
    }

    pub fn context(&self) -> &DashboardContext {
        &self.context
    }

    /// The in-memory response cache
    pub fn cache(&self) -> &ResponseCache<Value> {
        &self.cache
    }

    /// Fetches (or reuses) and transforms current weather for `city`
    pub async fn load_weather(&mut self, city: &str) -> Result<&WeatherSnapshot, LoadError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(LoadError::EmptyQuery("city name"));
        }

        let key = weather_cache_key(city);
        let client = &self.weather_client;
        let raw = self
            .cache
            .get_or_fetch(&key, self.ttl, || client.fetch_current_weather(city))
            .await?;

        let Some(observation) = transform_weather(Some(&raw)) else {
            // Don't keep serving a payload we can't read
            self.cache.invalidate(&key);
            tracing::warn!(city, "weather payload could not be transformed");
            return Err(LoadError::MalformedWeather {
                city: city.to_string(),
            });
        };

        tracing::info!(city, temp_c = ?observation.temp_c, "weather loaded");
        Ok(self.context.weather.insert(WeatherSnapshot {
            city: city.to_string(),
            observation,
            loaded_at: Utc::now(),
        }))
    }

    /// Fetches (or reuses) and transforms the price series for `query`
    pub async fn load_series(&mut self, query: &FinanceQuery) -> Result<&SeriesSnapshot, LoadError> {
        if query.symbol.trim().is_empty() {
            return Err(LoadError::EmptyQuery("stock symbol"));
        }

        let key = query.cache_key();
        let client = &self.finance_client;
        let raw = self
            .cache
            .get_or_fetch(&key, self.ttl, || client.fetch_series(query))
            .await?;

        let Some(series) = transform_finance(Some(&raw), &query.symbol) else {
            // Throttle notices arrive as 200s; let the next try refetch
            self.cache.invalidate(&key);
            let reason = describe_error_payload(&raw);
            tracing::warn!(symbol = %query.symbol, ?reason, "no time series in finance payload");
            return Err(LoadError::NoSeries {
                symbol: query.symbol.clone(),
                reason,
            });
        };

        tracing::info!(symbol = %query.symbol, points = series.len(), "price series loaded");
        let analysis = SeriesAnalysis::compute(&series);
        Ok(self.context.series.insert(SeriesSnapshot {
            query: query.clone(),
            series,
            analysis,
            loaded_at: Utc::now(),
        }))
    }

    /// Drops the cached weather payload for `city` and loads it again
    pub async fn refresh_weather(&mut self, city: &str) -> Result<&WeatherSnapshot, LoadError> {
        self.cache.invalidate(&weather_cache_key(city));
        self.load_weather(city).await
    }

    /// Drops the cached finance payload for `query` and loads it again
    pub async fn refresh_series(&mut self, query: &FinanceQuery) -> Result<&SeriesSnapshot, LoadError> {
        self.cache.invalidate(&query.cache_key());
        self.load_series(query).await
    }
}
