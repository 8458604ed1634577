//! Loading the weather detail view for one city.

use serde::Serialize;

use crate::{
    forecast::daily_from_forecast,
    model::{CurrentWeather, ForecastDay},
    provider::WeatherProvider,
    route::CityRoute,
    store::WeatherStore,
};

/// Everything the detail view renders.
#[derive(Debug, Clone, Serialize)]
pub struct WeatherReport {
    pub city: String,
    pub current: CurrentWeather,
    pub days: Vec<ForecastDay>,
}

#[derive(Debug, Clone)]
pub enum DetailView {
    Loaded(WeatherReport),
    /// The whole view is replaced by this message.
    Error(String),
}

/// Fetch current conditions, then the forecast, and cache the current summary.
///
/// Any fetch failure yields [`DetailView::Error`] and leaves the store
/// untouched. A failing store write is logged and otherwise ignored.
pub async fn load_detail(
    provider: &dyn WeatherProvider,
    store: &dyn WeatherStore,
    route: &CityRoute,
) -> DetailView {
    let current = match provider.current(&route.coordinates).await {
        Ok(current) => current,
        Err(err) => {
            tracing::error!(city = %route.name, "Error fetching weather data: {err}");
            return DetailView::Error(err.user_message().to_string());
        }
    };

    let forecast = match provider.forecast(&route.coordinates).await {
        Ok(forecast) => forecast,
        Err(err) => {
            tracing::error!(city = %route.name, "Error fetching forecast data: {err}");
            return DetailView::Error(err.user_message().to_string());
        }
    };

    let days = daily_from_forecast(&forecast);

    if let Err(err) = store.set(&route.name, current.summary()) {
        tracing::warn!(city = %route.name, "Error caching weather summary: {err:#}");
    }

    DetailView::Loaded(WeatherReport {
        city: route.name.clone(),
        current,
        days,
    })
}
