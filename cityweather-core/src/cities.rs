//! Client for the open-data city search API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt::Debug, time::Duration};

use crate::{
    config::CitiesConfig,
    error::{FetchError, fetch_json},
    model::{City, Coordinates},
};

const REQUEST_TIMEOUT_SECS: u64 = 15;
const SORT_FIELD: &str = "name";

/// One page of the city search: zero-based page index plus optional filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub query: String,
    pub page: u32,
    pub rows: u32,
}

impl PageRequest {
    /// Offset of the first row of this page.
    pub fn start(&self) -> u64 {
        u64::from(self.page) * u64::from(self.rows)
    }
}

#[async_trait]
pub trait CitySearch: Send + Sync + Debug {
    async fn search(&self, request: &PageRequest) -> Result<Vec<City>, FetchError>;
}

#[derive(Debug, Clone)]
pub struct OpenDataSoftClient {
    http: Client,
    base_url: String,
    dataset: String,
}

impl OpenDataSoftClient {
    pub fn new(base_url: impl Into<String>, dataset: impl Into<String>) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| FetchError::request("city search client", e))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            dataset: dataset.into(),
        })
    }

    pub fn from_config(config: &CitiesConfig) -> Result<Self, FetchError> {
        Self::new(config.base_url.clone(), config.dataset.clone())
    }
}

#[async_trait]
impl CitySearch for OpenDataSoftClient {
    async fn search(&self, request: &PageRequest) -> Result<Vec<City>, FetchError> {
        let rows = request.rows.to_string();
        let start = request.start().to_string();

        let mut params: Vec<(&str, &str)> = vec![
            ("dataset", self.dataset.as_str()),
            ("rows", rows.as_str()),
            ("start", start.as_str()),
            ("sort", SORT_FIELD),
        ];

        let query = request.query.trim();
        if !query.is_empty() {
            params.push(("q", query));
        }

        tracing::debug!(query, page = request.page, rows = request.rows, "searching cities");

        let parsed: OdsSearchResponse =
            fetch_json("City search", self.http.get(&self.base_url).query(&params)).await?;

        Ok(parsed.records.into_iter().map(|r| r.fields.into()).collect())
    }
}

#[derive(Debug, Deserialize)]
struct OdsSearchResponse {
    #[serde(default)]
    records: Vec<OdsRecord>,
}

#[derive(Debug, Deserialize)]
struct OdsRecord {
    fields: OdsFields,
}

/// The dataset publishes the id as text, older exports as a number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OdsId {
    Number(u64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct OdsFields {
    geoname_id: OdsId,
    name: String,
    cou_name_en: Option<String>,
    timezone: Option<String>,
    coordinates: [f64; 2],
    #[serde(default)]
    population: u64,
}

impl From<OdsFields> for City {
    fn from(f: OdsFields) -> Self {
        let id = match f.geoname_id {
            OdsId::Number(n) => n.to_string(),
            OdsId::Text(s) => s,
        };

        City {
            id,
            name: f.name,
            country: f.cou_name_en,
            timezone: f.timezone,
            coordinates: Coordinates::new(f.coordinates[0], f.coordinates[1]),
            population: f.population,
            weather: None,
        }
    }
}
