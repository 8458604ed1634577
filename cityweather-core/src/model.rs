use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

/// Latitude/longitude pair, in that order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Unit system passed to the weather API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    Standard,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Standard => "standard",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Metric, Units::Imperial, Units::Standard]
    }

    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
            Units::Standard => "K",
        }
    }

    pub fn wind_suffix(&self) -> &'static str {
        match self {
            Units::Imperial => "mph",
            Units::Metric | Units::Standard => "m/s",
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            "standard" => Ok(Units::Standard),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported: metric, imperial, standard."
            )),
        }
    }
}

/// Coarse weather group, mapped from the provider's `main` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCategory {
    Clear,
    Clouds,
    Rain,
    Snow,
    Thunderstorm,
    Fog,
    #[default]
    Other,
}

impl WeatherCategory {
    pub fn from_main(main: &str) -> Self {
        match main.to_lowercase().as_str() {
            "clear" => Self::Clear,
            "clouds" => Self::Clouds,
            "rain" | "drizzle" => Self::Rain,
            "snow" => Self::Snow,
            "thunderstorm" => Self::Thunderstorm,
            "mist" | "fog" | "haze" => Self::Fog,
            _ => Self::Other,
        }
    }

    /// Terminal glyph for the category.
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Clear => "☀",
            Self::Clouds | Self::Other => "☁",
            Self::Rain => "☂",
            Self::Snow => "❄",
            Self::Thunderstorm => "⚡",
            Self::Fog => "≋",
        }
    }
}

/// Last-known weather for a city, as cached between screens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSummary {
    pub temp: f64,
    pub high: f64,
    pub low: f64,
    pub description: String,
}

/// One row of the city list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: String,
    pub name: String,
    pub country: Option<String>,
    pub timezone: Option<String>,
    pub coordinates: Coordinates,
    pub population: u64,
    pub weather: Option<WeatherSummary>,
}

impl City {
    /// Attach a cached weather summary to this row.
    pub fn with_summary(mut self, summary: WeatherSummary) -> Self {
        self.weather = Some(summary);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: u8,
    pub pressure: u32,
    pub wind_speed: f64,
    pub description: String,
    pub icon: String,
    pub category: WeatherCategory,
    pub observed_at: DateTime<Utc>,
}

impl CurrentWeather {
    /// The subset persisted for the city list.
    pub fn summary(&self) -> WeatherSummary {
        WeatherSummary {
            temp: self.temperature,
            high: self.temp_max,
            low: self.temp_min,
            description: self.description.clone(),
        }
    }

    pub fn icon_url(&self) -> String {
        icon_url(&self.icon)
    }
}

/// A single 3-hour forecast entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastSample {
    pub time: DateTime<Utc>,
    pub temp_max: f64,
    pub temp_min: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub description: String,
    pub icon: String,
    pub category: WeatherCategory,
    /// Probability of precipitation, 0.0..=1.0.
    pub pop: f64,
}

/// Forecast samples together with the location's offset from UTC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forecast {
    pub utc_offset_secs: i32,
    pub samples: Vec<ForecastSample>,
}

/// Aggregated conditions for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub weekday: String,
    pub temp_max: f64,
    pub temp_min: f64,
    pub description: String,
    pub icon: String,
    pub category: WeatherCategory,
    pub humidity: u8,
    pub wind_speed: f64,
    /// Probability of precipitation in percent.
    pub precipitation: f64,
}

pub fn icon_url(code: &str) -> String {
    format!("{ICON_BASE_URL}/{code}@2x.png")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_from_main_groups_related_conditions() {
        assert_eq!(WeatherCategory::from_main("Drizzle"), WeatherCategory::Rain);
        assert_eq!(WeatherCategory::from_main("rain"), WeatherCategory::Rain);
        assert_eq!(WeatherCategory::from_main("Haze"), WeatherCategory::Fog);
        assert_eq!(WeatherCategory::from_main("Mist"), WeatherCategory::Fog);
        assert_eq!(WeatherCategory::from_main("Tornado"), WeatherCategory::Other);
    }

    #[test]
    fn units_parse_and_suffixes() {
        assert_eq!(Units::try_from("Imperial").unwrap(), Units::Imperial);
        assert!(Units::try_from("kelvinish").is_err());
        assert_eq!(Units::Metric.temperature_suffix(), "°C");
        assert_eq!(Units::Imperial.wind_suffix(), "mph");
    }

    #[test]
    fn icon_url_uses_double_density_png() {
        assert_eq!(icon_url("10d"), "https://openweathermap.org/img/wn/10d@2x.png");
    }

    #[test]
    fn summary_takes_high_and_low_from_min_max() {
        let current = CurrentWeather {
            temperature: 12.5,
            feels_like: 11.0,
            temp_min: 9.0,
            temp_max: 14.0,
            humidity: 70,
            pressure: 1012,
            wind_speed: 3.1,
            description: "light rain".into(),
            icon: "10d".into(),
            category: WeatherCategory::Rain,
            observed_at: Utc::now(),
        };

        let summary = current.summary();
        assert_eq!(summary.temp, 12.5);
        assert_eq!(summary.high, 14.0);
        assert_eq!(summary.low, 9.0);
        assert_eq!(summary.description, "light rain");
    }
}
