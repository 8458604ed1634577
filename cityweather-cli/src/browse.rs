//! Interactive city browser: the list screen with search, sort and
//! "load more" in place of scroll-triggered pagination.

use anyhow::Result;
use inquire::{InquireError, Select, Text};
use std::fmt;

use cityweather_core::{
    City, CityRoute, LoadOutcome, PaginationController, SortColumn, SortState, sort_cities,
};

use crate::{cli::App, render};

const PAGE_SIZE: usize = 15;

enum Entry {
    City(Box<City>),
    LoadMore,
    Search,
    Sort,
    Quit,
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::City(city) => write!(f, "{}", render::CityRow(city)),
            Entry::LoadMore => f.write_str("↓ Load more"),
            Entry::Search => f.write_str("⌕ Search…"),
            Entry::Sort => f.write_str("⇅ Sort…"),
            Entry::Quit => f.write_str("✕ Quit"),
        }
    }
}

struct SortChoice {
    column: SortColumn,
    label: &'static str,
}

impl fmt::Display for SortChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.column, self.label)
    }
}

/// Esc and Ctrl-C end the prompt without an error.
fn cancelled<T>(result: Result<T, InquireError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn load_more(controller: &PaginationController) {
    match controller.load_next().await {
        LoadOutcome::Failed(err) => eprintln!("Failed to load cities: {err}"),
        LoadOutcome::Exhausted => println!("No more cities."),
        LoadOutcome::Loaded(_) | LoadOutcome::Skipped | LoadOutcome::Stale => {}
    }
}

pub async fn run(app: &App, query: &str) -> Result<()> {
    let controller = app.controller()?;
    let mut sort = SortState::default();

    controller.set_query(query);
    load_more(&controller).await;

    loop {
        let rows = sort_cities(&controller.rows(), &sort);
        if rows.is_empty() {
            println!("{}", render::NO_RESULTS);
        }

        let mut entries: Vec<Entry> = rows
            .into_iter()
            .map(|city| Entry::City(Box::new(city)))
            .collect();
        if !controller.is_exhausted() {
            entries.push(Entry::LoadMore);
        }
        entries.extend([Entry::Search, Entry::Sort, Entry::Quit]);

        let query = controller.query();
        let title = if query.is_empty() {
            "Cities:".to_string()
        } else {
            format!("Cities matching '{query}':")
        };

        let Some(entry) = cancelled(Select::new(&title, entries).with_page_size(PAGE_SIZE).prompt())?
        else {
            break;
        };

        match entry {
            Entry::City(city) => {
                let route = CityRoute::from(city.as_ref());
                tracing::debug!(route = %route, "opening city");
                if let Some(message) = app.show(&route).await? {
                    eprintln!("Error: {message}");
                }
                controller.refresh_cached();
            }
            Entry::LoadMore => load_more(&controller).await,
            Entry::Search => {
                let Some(text) =
                    cancelled(Text::new("Search cities:").with_initial_value(&query).prompt())?
                else {
                    continue;
                };
                if controller.set_query(text.trim()) {
                    load_more(&controller).await;
                }
            }
            Entry::Sort => {
                let choices: Vec<SortChoice> = SortColumn::all()
                    .iter()
                    .map(|&column| SortChoice {
                        column,
                        label: sort.action_label(column),
                    })
                    .collect();
                if let Some(choice) = cancelled(Select::new("Sort by:", choices).prompt())? {
                    sort.toggle(choice.column);
                }
            }
            Entry::Quit => break,
        }
    }

    Ok(())
}
