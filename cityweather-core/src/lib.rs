//! Core library for the `cityweather` CLI.
//!
//! This crate defines:
//! - Configuration handling
//! - Clients for the city search and weather APIs
//! - The paginated, sortable city list and the weather detail loader
//! - Forecast aggregation into daily records
//! - A name-keyed cache of last-seen weather
//!
//! It is used by `cityweather-cli`, but can also be reused by other front ends.

pub mod cities;
pub mod config;
pub mod detail;
pub mod error;
pub mod forecast;
pub mod model;
pub mod pagination;
pub mod provider;
pub mod route;
pub mod sort;
pub mod store;

pub use cities::{CitySearch, OpenDataSoftClient, PageRequest};
pub use config::Config;
pub use detail::{DetailView, WeatherReport, load_detail};
pub use error::FetchError;
pub use model::{
    City, Coordinates, CurrentWeather, Forecast, ForecastDay, ForecastSample, Units,
    WeatherCategory, WeatherSummary,
};
pub use pagination::{LoadOutcome, PaginationController, Paginator};
pub use provider::{OpenWeatherProvider, WeatherProvider};
pub use route::CityRoute;
pub use sort::{SortColumn, SortDirection, SortState, sort_cities};
pub use store::{JsonFileStore, MemoryStore, WeatherStore};
