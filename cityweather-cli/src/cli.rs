use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select};
use std::sync::Arc;

use cityweather_core::{
    CityRoute, Config, Coordinates, DetailView, JsonFileStore, LoadOutcome, OpenDataSoftClient,
    OpenWeatherProvider, PaginationController, SortColumn, SortDirection, SortState, Units,
    load_detail, sort_cities,
};

use crate::{browse, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityweather", version, about = "Browse world cities and their weather")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the OpenWeather API key and unit system.
    Configure,

    /// List cities, optionally filtered and sorted.
    Cities {
        /// Free-text filter.
        #[arg(short, long, default_value = "")]
        query: String,

        /// Number of pages to load.
        #[arg(long, default_value_t = 1)]
        pages: u32,

        /// Sort the loaded rows by this column.
        #[arg(long, value_parser = parse_sort_column)]
        sort: Option<SortColumn>,

        /// Sort descending.
        #[arg(long, requires = "sort")]
        desc: bool,
    },

    /// Show current weather and the 5-day forecast for a city.
    Show {
        /// Detail route, e.g. "/weather/Oslo/59.91273/10.74609".
        #[arg(required_unless_present = "name")]
        route: Option<String>,

        /// City name (with --lat and --lon) instead of a route.
        #[arg(long, conflicts_with = "route", requires_all = ["lat", "lon"])]
        name: Option<String>,

        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, allow_hyphen_values = true)]
        lon: Option<f64>,
    },

    /// Interactively search, sort and open cities.
    Browse {
        /// Initial free-text filter.
        #[arg(short, long, default_value = "")]
        query: String,
    },
}

fn parse_sort_column(value: &str) -> Result<SortColumn, String> {
    SortColumn::try_from(value).map_err(|e| e.to_string())
}

/// Loaded configuration plus the shared weather cache.
pub struct App {
    pub config: Config,
    pub store: Arc<JsonFileStore>,
}

impl App {
    pub fn load() -> Result<Self> {
        let config = Config::load()?;
        let store = Arc::new(JsonFileStore::new(config.store_path()?));
        Ok(Self { config, store })
    }

    pub fn controller(&self) -> Result<PaginationController> {
        let source = OpenDataSoftClient::from_config(&self.config.cities)
            .context("Failed to create city search client")?;

        Ok(PaginationController::new(Arc::new(source), self.config.cities.page_size)
            .with_store(self.store.clone()))
    }

    pub fn provider(&self) -> Result<OpenWeatherProvider> {
        OpenWeatherProvider::from_config(&self.config)
    }

    /// Load and print the detail view. Returns the error message if the view failed.
    pub async fn show(&self, route: &CityRoute) -> Result<Option<String>> {
        let provider = self.provider()?;
        match load_detail(&provider, self.store.as_ref(), route).await {
            DetailView::Loaded(report) => {
                println!(
                    "{}",
                    render::Detail {
                        report: &report,
                        units: provider.units(),
                    }
                );
                Ok(None)
            }
            DetailView::Error(message) => Ok(Some(message)),
        }
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Cities {
                query,
                pages,
                sort,
                desc,
            } => {
                let direction = if desc { SortDirection::Desc } else { SortDirection::Asc };
                let state = sort.map(|c| SortState::by(c, direction)).unwrap_or_default();
                list_cities(&App::load()?, &query, pages, state).await
            }
            Command::Show {
                route,
                name,
                lat,
                lon,
            } => {
                let route = match (route, name, lat, lon) {
                    (Some(route), _, _, _) => route.parse::<CityRoute>()?,
                    (None, Some(name), Some(lat), Some(lon)) => {
                        CityRoute::new(name, Coordinates::new(lat, lon))
                    }
                    _ => return Err(anyhow!("Provide a route or --name with --lat and --lon")),
                };

                match App::load()?.show(&route).await? {
                    None => Ok(()),
                    Some(message) => Err(anyhow!(message)),
                }
            }
            Command::Browse { query } => browse::run(&App::load()?, &query).await,
        }
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Get one at https://home.openweathermap.org/api_keys")
        .prompt()?;

    let units = Units::all().to_vec();
    let current = units.iter().position(|u| *u == config.units).unwrap_or(0);
    let units = Select::new("Unit system:", units)
        .with_starting_cursor(current)
        .prompt()?;

    if !api_key.trim().is_empty() {
        config.set_api_key(api_key.trim().to_string());
    }
    config.units = units;
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn list_cities(app: &App, query: &str, pages: u32, sort: SortState) -> Result<()> {
    let controller = app.controller()?;
    controller.set_query(query);

    for _ in 0..pages.max(1) {
        match controller.load_next().await {
            LoadOutcome::Loaded(_) => {}
            LoadOutcome::Exhausted | LoadOutcome::Skipped | LoadOutcome::Stale => break,
            LoadOutcome::Failed(err) => {
                eprintln!("Failed to load cities: {err}");
                break;
            }
        }
    }

    let rows = sort_cities(&controller.rows(), &sort);
    println!("{}", render::CityTable(&rows));

    if !rows.is_empty() {
        println!("\nOpen a city with `cityweather show <route>`:");
    }
    for city in &rows {
        println!("  {:<24} {}", render::truncate(&city.name, 24), CityRoute::from(city));
    }

    Ok(())
}
