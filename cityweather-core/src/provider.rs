use crate::{
    error::FetchError,
    model::{Coordinates, CurrentWeather, Forecast},
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

pub use openweather::OpenWeatherProvider;

/// Source of current conditions and the multi-day forecast for a coordinate pair.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, at: &Coordinates) -> Result<CurrentWeather, FetchError>;

    /// Time-ordered 3-hour samples.
    async fn forecast(&self, at: &Coordinates) -> Result<Forecast, FetchError>;
}
