//! Client-side ordering of the loaded city rows.
//!
//! Sorting only ever sees the rows currently in memory, never the full
//! remote dataset, and is not persisted.

use std::cmp::Ordering;

use crate::model::City;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortColumn {
    Name,
    Country,
    Timezone,
    Population,
    /// Cached temperature, only known for cities visited before.
    Temperature,
}

impl SortColumn {
    pub const fn all() -> &'static [SortColumn] {
        &[
            SortColumn::Name,
            SortColumn::Country,
            SortColumn::Timezone,
            SortColumn::Population,
            SortColumn::Temperature,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortColumn::Name => "name",
            SortColumn::Country => "country",
            SortColumn::Timezone => "timezone",
            SortColumn::Population => "population",
            SortColumn::Temperature => "temperature",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, SortColumn::Population | SortColumn::Temperature)
    }

    fn key(&self, city: &City) -> Option<SortKey> {
        match self {
            SortColumn::Name => Some(SortKey::text(&city.name)),
            SortColumn::Country => city.country.as_deref().map(SortKey::text),
            SortColumn::Timezone => city.timezone.as_deref().map(SortKey::text),
            SortColumn::Population => Some(SortKey::Number(city.population as f64)),
            SortColumn::Temperature => city.weather.as_ref().map(|w| SortKey::Number(w.temp)),
        }
    }
}

impl std::fmt::Display for SortColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SortColumn {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        SortColumn::all()
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown sort column '{value}'. Supported: name, country, timezone, population, temperature."
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Selected column and direction. No column means server order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    pub column: Option<SortColumn>,
    pub direction: SortDirection,
}

impl SortState {
    pub fn by(column: SortColumn, direction: SortDirection) -> Self {
        Self {
            column: Some(column),
            direction,
        }
    }

    /// Re-selecting the active column flips direction; a new column starts ascending.
    pub fn toggle(&mut self, column: SortColumn) {
        if self.column == Some(column) {
            self.direction = self.direction.flipped();
        } else {
            self.column = Some(column);
            self.direction = SortDirection::Asc;
        }
    }

    /// Menu label for the action that selecting `column` would perform.
    pub fn action_label(&self, column: SortColumn) -> &'static str {
        let next_desc = self.column == Some(column) && self.direction == SortDirection::Asc;
        match (column.is_numeric(), next_desc) {
            (false, false) => "A-Z",
            (false, true) => "Z-A",
            (true, false) => "Low-High",
            (true, true) => "High-Low",
        }
    }
}

#[derive(Debug, Clone)]
enum SortKey {
    /// Folded collation key plus the raw value as tie-break.
    Text(String, String),
    Number(f64),
}

impl SortKey {
    fn text(raw: &str) -> Self {
        SortKey::Text(deunicode::deunicode(raw).to_lowercase(), raw.to_string())
    }

    fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Text(a, raw_a), SortKey::Text(b, raw_b)) => {
                a.cmp(b).then_with(|| raw_a.cmp(raw_b))
            }
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            _ => Ordering::Equal,
        }
    }
}

/// Return the rows ordered by `state`.
///
/// Rows without a value for the column stay where they are; the rows that do
/// have one are sorted among the remaining positions. The sort is stable.
pub fn sort_cities(rows: &[City], state: &SortState) -> Vec<City> {
    let mut out = rows.to_vec();
    let Some(column) = state.column else {
        return out;
    };

    let keyed: Vec<(usize, SortKey)> = rows
        .iter()
        .enumerate()
        .filter_map(|(i, city)| column.key(city).map(|k| (i, k)))
        .collect();

    let slots: Vec<usize> = keyed.iter().map(|(i, _)| *i).collect();
    let mut ordered = keyed;
    ordered.sort_by(|(_, a), (_, b)| match state.direction {
        SortDirection::Asc => a.compare(b),
        SortDirection::Desc => b.compare(a),
    });

    for (slot, (src, _)) in slots.into_iter().zip(ordered) {
        out[slot] = rows[src].clone();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Coordinates, WeatherSummary};

    fn city(name: &str, country: Option<&str>, population: u64) -> City {
        City {
            id: name.to_lowercase(),
            name: name.to_string(),
            country: country.map(str::to_string),
            timezone: None,
            coordinates: Coordinates::new(0.0, 0.0),
            population,
            weather: None,
        }
    }

    fn names(rows: &[City]) -> Vec<&str> {
        rows.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn no_column_keeps_server_order() {
        let rows = vec![city("B", None, 2), city("A", None, 1)];
        let sorted = sort_cities(&rows, &SortState::default());
        assert_eq!(names(&sorted), ["B", "A"]);
    }

    #[test]
    fn numeric_desc_is_exact_reverse_of_asc() {
        let rows = vec![
            city("A", None, 300),
            city("B", None, 10),
            city("C", None, 7_000),
            city("D", None, 55),
        ];

        let asc = sort_cities(&rows, &SortState::by(SortColumn::Population, SortDirection::Asc));
        let mut desc =
            sort_cities(&rows, &SortState::by(SortColumn::Population, SortDirection::Desc));
        desc.reverse();

        assert_eq!(names(&asc), ["B", "D", "A", "C"]);
        assert_eq!(asc, desc);
    }

    #[test]
    fn names_fold_accents_and_case() {
        let rows = vec![
            city("zurich", None, 1),
            city("Århus", None, 1),
            city("Berlin", None, 1),
            city("Ōsaka", None, 1),
        ];

        let asc = sort_cities(&rows, &SortState::by(SortColumn::Name, SortDirection::Asc));
        assert_eq!(names(&asc), ["Århus", "Berlin", "Ōsaka", "zurich"]);

        let desc = sort_cities(&rows, &SortState::by(SortColumn::Name, SortDirection::Desc));
        assert_eq!(names(&desc), ["zurich", "Ōsaka", "Berlin", "Århus"]);
    }

    #[test]
    fn repeated_toggles_alternate_consistently() {
        let rows = vec![city("b", None, 1), city("c", None, 1), city("a", None, 1)];
        let mut state = SortState::default();

        state.toggle(SortColumn::Name);
        assert_eq!(names(&sort_cities(&rows, &state)), ["a", "b", "c"]);
        state.toggle(SortColumn::Name);
        assert_eq!(names(&sort_cities(&rows, &state)), ["c", "b", "a"]);
        state.toggle(SortColumn::Name);
        assert_eq!(names(&sort_cities(&rows, &state)), ["a", "b", "c"]);
    }

    #[test]
    fn switching_column_resets_to_ascending() {
        let mut state = SortState::by(SortColumn::Name, SortDirection::Desc);
        state.toggle(SortColumn::Population);
        assert_eq!(state, SortState::by(SortColumn::Population, SortDirection::Asc));
    }

    #[test]
    fn missing_values_keep_their_position() {
        let rows = vec![
            city("A", Some("Peru"), 1),
            city("B", None, 1),
            city("C", Some("Chile"), 1),
        ];

        let sorted = sort_cities(&rows, &SortState::by(SortColumn::Country, SortDirection::Asc));
        assert_eq!(names(&sorted), ["C", "B", "A"]);
    }

    #[test]
    fn temperature_sorts_only_cities_with_cached_weather() {
        let summary = |t: f64| WeatherSummary {
            temp: t,
            high: t,
            low: t,
            description: String::new(),
        };
        let rows = vec![
            city("Hot", None, 1).with_summary(summary(30.0)),
            city("Unvisited", None, 1),
            city("Cold", None, 1).with_summary(summary(-5.0)),
        ];

        let sorted =
            sort_cities(&rows, &SortState::by(SortColumn::Temperature, SortDirection::Asc));
        assert_eq!(names(&sorted), ["Cold", "Unvisited", "Hot"]);
    }

    #[test]
    fn action_labels_describe_next_direction() {
        let mut state = SortState::default();
        assert_eq!(state.action_label(SortColumn::Name), "A-Z");
        assert_eq!(state.action_label(SortColumn::Population), "Low-High");

        state.toggle(SortColumn::Population);
        assert_eq!(state.action_label(SortColumn::Population), "High-Low");
        assert_eq!(state.action_label(SortColumn::Name), "A-Z");
    }

    #[test]
    fn column_parses_case_insensitively() {
        assert_eq!(SortColumn::try_from("Population").unwrap(), SortColumn::Population);
        assert!(SortColumn::try_from("elevation").is_err());
    }
}
