//! Detail-view paths: `/weather/{name}/{lat}/{lon}`.

use std::{fmt, str::FromStr};
use thiserror::Error;

use crate::model::{City, Coordinates};

const PREFIX: &str = "weather";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("Route must look like /weather/<city>/<lat>/<lon>, got '{0}'")]
    Shape(String),

    #[error("City name in route is not valid percent-encoded UTF-8: {0}")]
    Name(String),

    #[error("Invalid {axis} '{value}' in route")]
    Coordinate { axis: &'static str, value: String },
}

/// City name and coordinates carried from the list to the detail view.
#[derive(Debug, Clone, PartialEq)]
pub struct CityRoute {
    pub name: String,
    pub coordinates: Coordinates,
}

impl CityRoute {
    pub fn new(name: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            name: name.into(),
            coordinates,
        }
    }

    pub fn to_path(&self) -> String {
        format!(
            "/{PREFIX}/{}/{}/{}",
            urlencoding::encode(&self.name),
            self.coordinates.latitude,
            self.coordinates.longitude
        )
    }
}

impl From<&City> for CityRoute {
    fn from(city: &City) -> Self {
        Self::new(city.name.clone(), city.coordinates)
    }
}

impl fmt::Display for CityRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path())
    }
}

fn parse_axis(axis: &'static str, value: &str) -> Result<f64, RouteError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| RouteError::Coordinate {
            axis,
            value: value.to_string(),
        })
}

impl FromStr for CityRoute {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('/').trim_end_matches('/');
        let parts: Vec<&str> = trimmed.split('/').collect();

        let [prefix, name, lat, lon] = parts.as_slice() else {
            return Err(RouteError::Shape(s.to_string()));
        };
        if *prefix != PREFIX || name.is_empty() {
            return Err(RouteError::Shape(s.to_string()));
        }

        let name = urlencoding::decode(name)
            .map_err(|e| RouteError::Name(e.to_string()))?
            .into_owned();

        Ok(Self::new(
            name,
            Coordinates::new(parse_axis("latitude", lat)?, parse_axis("longitude", lon)?),
        ))
    }
}
