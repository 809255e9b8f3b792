//! OpenWeatherMap current-weather client
//!
//! `WeatherClient` returns the raw JSON payload; `transform_weather` turns it
//! into a `WeatherObservation`. Keeping the two apart lets the dashboard cache
//! the raw payload and re-run the transform on every read.

use chrono::DateTime;
use reqwest::Client;
use serde_json::Value;

use super::{weather_cache_key, FetchError, WeatherObservation};
use crate::cache::CacheManager;

/// Base URL for the OpenWeatherMap current-weather endpoint
const OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// How long a raw response stays fresh in the disk cache (10 minutes)
pub const DISK_CACHE_TTL_SECS: u64 = 600;

/// Offset between Kelvin and Celsius
const KELVIN_OFFSET: f64 = 273.15;

/// Client for fetching current conditions from OpenWeatherMap
#[derive(Debug, Clone)]
pub struct WeatherClient {
    http_client: Client,
    api_key: Option<String>,
    cache_manager: Option<CacheManager>,
    base_url: String,
}

impl WeatherClient {
    /// Create a new WeatherClient using the given API key
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key,
            cache_manager: None,
            base_url: OPENWEATHER_BASE_URL.to_string(),
        }
    }

    /// Persist raw responses in `cache_manager` for `DISK_CACHE_TTL_SECS`
    pub fn with_cache(mut self, cache_manager: CacheManager) -> Self {
        self.cache_manager = Some(cache_manager);
        self
    }

    /// Point the client at a different endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch the raw current-weather payload for a city
    ///
    /// # Arguments
    /// * `city` - City name or location query (e.g. "London" or "London,GB")
    ///
    /// # Returns
    /// * `Ok(Value)` - The JSON body, from the disk cache when still fresh
    /// * `Err(FetchError)` - If no key is configured, the request fails, or
    ///   the server answers with an error status
    pub async fn fetch_current_weather(&self, city: &str) -> Result<Value, FetchError> {
        let cache_key = weather_cache_key(city);

        if let Some(ref cache) = self.cache_manager {
            if let Some(data) = cache.read_fresh::<Value>(&cache_key) {
                tracing::debug!(city, "weather served from disk cache");
                return Ok(data);
            }
        }

        let api_key = self
            .api_key
            .as_deref()
            .ok_or(FetchError::MissingApiKey("OpenWeatherMap"))?;

        tracing::info!(city, "fetching current weather");
        let response = self
            .http_client
            .get(&self.base_url)
            .query(&[("q", city), ("appid", api_key)])
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
        let data: Value = serde_json::from_str(&text)?;

        if let Some(ref cache) = self.cache_manager {
            if let Err(e) = cache.write(&cache_key, &data, DISK_CACHE_TTL_SECS) {
                tracing::warn!(error = %e, "failed to write weather cache");
            }
        }

        Ok(data)
    }
}

fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - KELVIN_OFFSET
}

/// Reads an integer, accepting whole-valued floats such as `1012.0`
fn as_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

/// Normalize an OpenWeatherMap payload into a `WeatherObservation`
///
/// Returns `None` for an absent, empty, or non-object payload, or when the
/// observation time `dt` is missing or out of range. Any other missing field
/// becomes `None` in the observation rather than failing the whole record.
pub fn transform_weather(raw: Option<&Value>) -> Option<WeatherObservation> {
    let obj = raw?.as_object()?;
    if obj.is_empty() {
        return None;
    }

    let Some(timestamp) = obj
        .get("dt")
        .and_then(as_integer)
        .and_then(|dt| DateTime::from_timestamp(dt, 0))
    else {
        tracing::debug!("weather payload has no usable `dt`");
        return None;
    };

    let main = obj.get("main");
    let main_field = |name: &str| main.and_then(|m| m.get(name));
    let celsius = |name: &str| {
        main_field(name)
            .and_then(Value::as_f64)
            .map(kelvin_to_celsius)
    };

    let description = obj
        .get("weather")
        .and_then(Value::as_array)
        .and_then(|conditions| conditions.first())
        .and_then(|first| first.get("description"))
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(WeatherObservation {
        city: obj.get("name").and_then(Value::as_str).map(str::to_string),
        description,
        temp_c: celsius("temp"),
        feels_like_c: celsius("feels_like"),
        temp_min_c: celsius("temp_min"),
        temp_max_c: celsius("temp_max"),
        pressure: main_field("pressure").and_then(as_integer),
        humidity: main_field("humidity")
            .and_then(as_integer)
            .and_then(|h| u8::try_from(h).ok())
            .filter(|h| *h <= 100),
        wind_speed: obj
            .get("wind")
            .and_then(|w| w.get("speed"))
            .and_then(Value::as_f64),
        timestamp,
    })
}
