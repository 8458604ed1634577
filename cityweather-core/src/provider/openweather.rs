use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    config::Config,
    error::{FetchError, fetch_json},
    model::{Coordinates, CurrentWeather, Forecast, ForecastSample, Units, WeatherCategory},
};

use super::WeatherProvider;

const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    units: Units,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, units: Units, base_url: impl Into<String>) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| FetchError::request("OpenWeather client", e))?;

        Ok(Self {
            api_key,
            units,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Build a provider from config; fails when no API key is available.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let api_key = config.api_key()?;
        Ok(Self::new(api_key, config.units, config.weather.base_url.clone())?)
    }

    pub fn units(&self) -> Units {
        self.units
    }

    fn get(&self, endpoint: &str, at: &Coordinates) -> reqwest::RequestBuilder {
        let lat = at.latitude.to_string();
        let lon = at.longitude.to_string();

        self.http.get(format!("{}/{endpoint}", self.base_url)).query(&[
            ("lat", lat.as_str()),
            ("lon", lon.as_str()),
            ("units", self.units.as_str()),
            ("appid", self.api_key.as_str()),
        ])
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    #[serde(default)]
    temp: f64,
    #[serde(default)]
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: u8,
    #[serde(default)]
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    #[serde(default)]
    timezone: i32,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
    #[serde(default)]
    pop: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

/// Description, icon and category of the first weather entry.
fn describe(weather: &[OwWeather]) -> (String, String, WeatherCategory) {
    match weather.first() {
        Some(w) => (
            w.description.clone(),
            w.icon.clone(),
            WeatherCategory::from_main(&w.main),
        ),
        None => ("Unknown".to_string(), String::new(), WeatherCategory::Other),
    }
}

impl From<OwCurrentResponse> for CurrentWeather {
    fn from(parsed: OwCurrentResponse) -> Self {
        let (description, icon, category) = describe(&parsed.weather);

        CurrentWeather {
            temperature: parsed.main.temp,
            feels_like: parsed.main.feels_like,
            temp_min: parsed.main.temp_min,
            temp_max: parsed.main.temp_max,
            humidity: parsed.main.humidity,
            pressure: parsed.main.pressure,
            wind_speed: parsed.wind.speed,
            description,
            icon,
            category,
            observed_at: unix_to_utc(parsed.dt).unwrap_or_else(Utc::now),
        }
    }
}

impl OwForecastEntry {
    fn into_sample(self) -> Option<ForecastSample> {
        let Some(time) = unix_to_utc(self.dt) else {
            tracing::warn!(dt = self.dt, "skipping forecast entry with invalid timestamp");
            return None;
        };
        let (description, icon, category) = describe(&self.weather);

        Some(ForecastSample {
            time,
            temp_max: self.main.temp_max,
            temp_min: self.main.temp_min,
            humidity: self.main.humidity,
            wind_speed: self.wind.speed,
            description,
            icon,
            category,
            pop: self.pop,
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, at: &Coordinates) -> Result<CurrentWeather, FetchError> {
        tracing::debug!(lat = at.latitude, lon = at.longitude, "fetching current weather");

        let parsed: OwCurrentResponse =
            fetch_json("OpenWeather current", self.get("weather", at)).await?;

        Ok(parsed.into())
    }

    async fn forecast(&self, at: &Coordinates) -> Result<Forecast, FetchError> {
        tracing::debug!(lat = at.latitude, lon = at.longitude, "fetching 5-day forecast");

        let parsed: OwForecastResponse =
            fetch_json("OpenWeather forecast", self.get("forecast", at)).await?;

        Ok(Forecast {
            utc_offset_secs: parsed.city.timezone,
            samples: parsed
                .list
                .into_iter()
                .filter_map(OwForecastEntry::into_sample)
                .collect(),
        })
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_payload_maps_all_fields() {
        let body = r#"{
            "dt": 1704103200,
            "name": "Paris",
            "main": {"temp": 7.2, "feels_like": 4.9, "temp_min": 5.1, "temp_max": 8.3, "pressure": 1016, "humidity": 81},
            "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
            "wind": {"speed": 4.6, "deg": 230}
        }"#;

        let parsed: OwCurrentResponse = serde_json::from_str(body).unwrap();
        let current: CurrentWeather = parsed.into();

        assert_eq!(current.temperature, 7.2);
        assert_eq!(current.feels_like, 4.9);
        assert_eq!(current.temp_min, 5.1);
        assert_eq!(current.temp_max, 8.3);
        assert_eq!(current.pressure, 1016);
        assert_eq!(current.humidity, 81);
        assert_eq!(current.wind_speed, 4.6);
        assert_eq!(current.description, "light rain");
        assert_eq!(current.icon, "10d");
        assert_eq!(current.category, WeatherCategory::Rain);
        assert_eq!(current.observed_at.timestamp(), 1704103200);
    }

    #[test]
    fn empty_weather_array_is_unknown() {
        let (description, icon, category) = describe(&[]);
        assert_eq!(description, "Unknown");
        assert!(icon.is_empty());
        assert_eq!(category, WeatherCategory::Other);
    }

    #[test]
    fn forecast_entry_without_pop_defaults_to_zero() {
        let body = r#"{
            "dt": 1704103200,
            "main": {"temp": 1.0, "temp_min": 0.5, "temp_max": 1.5, "humidity": 90},
            "weather": [{"main": "Snow", "description": "light snow", "icon": "13n"}],
            "wind": {"speed": 2.0}
        }"#;

        let entry: OwForecastEntry = serde_json::from_str(body).unwrap();
        let sample = entry.into_sample().unwrap();

        assert_eq!(sample.pop, 0.0);
        assert_eq!(sample.category, WeatherCategory::Snow);
        assert_eq!(sample.temp_max, 1.5);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let provider =
            OpenWeatherProvider::new("KEY".into(), Units::Metric, "http://localhost:1234/").unwrap();
        assert_eq!(provider.base_url, "http://localhost:1234");
    }
}
