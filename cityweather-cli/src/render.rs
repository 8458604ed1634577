//! Plain-text rendering of the city table and the detail view.

use chrono::Local;
use std::fmt;

use cityweather_core::{City, Units, WeatherReport, forecast::outlook};

const NAME_WIDTH: usize = 24;
const COUNTRY_WIDTH: usize = 20;
const TIMEZONE_WIDTH: usize = 22;
const POPULATION_WIDTH: usize = 12;

pub const NO_RESULTS: &str = "No cities found.";
pub const NOT_VISITED: &str = "Click to view";

/// Population with thousands separators, e.g. `2,138,551`.
pub fn format_population(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Cut `s` to at most `width` characters, marking the cut with `…`.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut cut: String = s.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Cached summary for the list, or a hint to open the city.
///
/// Cached values carry no unit letter: they keep whatever unit system was
/// active when the city was opened.
pub fn weather_cell(city: &City) -> String {
    match &city.weather {
        Some(w) => format!(
            "{:.1}° {} (H: {:.1}° L: {:.1}°)",
            w.temp, w.description, w.high, w.low
        ),
        None => NOT_VISITED.to_string(),
    }
}

/// The city list as a fixed-width table.
pub struct CityTable<'a>(pub &'a [City]);

impl fmt::Display for CityTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<NAME_WIDTH$} {:<COUNTRY_WIDTH$} {:<TIMEZONE_WIDTH$} {:>POPULATION_WIDTH$}  Weather",
            "City", "Country", "Timezone", "Population"
        )?;
        write!(
            f,
            "{}",
            "-".repeat(NAME_WIDTH + COUNTRY_WIDTH + TIMEZONE_WIDTH + POPULATION_WIDTH + 12)
        )?;

        if self.0.is_empty() {
            return write!(f, "\n{NO_RESULTS}");
        }
        for city in self.0 {
            write!(f, "\n{}", CityRow(city))?;
        }
        Ok(())
    }
}

pub struct CityRow<'a>(pub &'a City);

impl fmt::Display for CityRow<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let city = self.0;
        write!(
            f,
            "{:<NAME_WIDTH$} {:<COUNTRY_WIDTH$} {:<TIMEZONE_WIDTH$} {:>POPULATION_WIDTH$}  {}",
            truncate(&city.name, NAME_WIDTH),
            truncate(city.country.as_deref().unwrap_or("-"), COUNTRY_WIDTH),
            truncate(city.timezone.as_deref().unwrap_or("-"), TIMEZONE_WIDTH),
            format_population(city.population),
            weather_cell(city)
        )
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Current conditions, the 5-day outlook and the detail block.
pub struct Detail<'a> {
    pub report: &'a WeatherReport,
    pub units: Units,
}

impl fmt::Display for Detail<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = self.units.temperature_suffix();
        let wind = self.units.wind_suffix();
        let c = &self.report.current;

        writeln!(f, "Weather for {}", self.report.city)?;
        writeln!(
            f,
            "Observed {}",
            c.observed_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        )?;
        writeln!(
            f,
            "{} {}{t}  {}",
            c.category.glyph(),
            c.temperature.round(),
            capitalize(&c.description)
        )?;
        writeln!(
            f,
            "Feels like {}{t} · Wind {} {wind} · Humidity {}% · Pressure {} hPa",
            c.feels_like.round(),
            c.wind_speed,
            c.humidity,
            c.pressure
        )?;
        writeln!(f, "Icon {}", c.icon_url())?;

        writeln!(f, "\n5-Day Forecast")?;
        for (label, day) in outlook(&self.report.days) {
            writeln!(
                f,
                "  {:<10} {:<10} {} {:>4}° / {:>4}°  {:<22} Precip {:>3.0}%  Hum {:>3}%  Wind {} {wind}",
                label,
                day.date.format("%-m/%-d/%Y"),
                day.category.glyph(),
                day.temp_max.round(),
                day.temp_min.round(),
                truncate(&capitalize(&day.description), 22),
                day.precipitation,
                day.humidity,
                day.wind_speed
            )?;
        }

        writeln!(f, "\nCurrent Weather Details")?;
        writeln!(f, "  Current     {:.1}{t}", c.temperature)?;
        writeln!(f, "  Feels Like  {:.1}{t}", c.feels_like)?;
        writeln!(f, "  Min         {:.1}{t}", c.temp_min)?;
        writeln!(f, "  Max         {:.1}{t}", c.temp_max)?;
        writeln!(f, "  Wind Speed  {} {wind}", c.wind_speed)?;
        writeln!(f, "  Humidity    {}%", c.humidity)?;
        writeln!(f, "  Pressure    {} hPa", c.pressure)?;
        write!(f, "  Weather     {}", capitalize(&c.description))
    }
}
