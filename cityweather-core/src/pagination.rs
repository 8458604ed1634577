//! Incremental loading of the city list.
//!
//! [`Paginator`] is the synchronous state machine; [`PaginationController`]
//! drives it against a [`CitySearch`] source. A query change cancels the
//! token handed out with any outstanding page, so a late response for the
//! old query is dropped instead of being appended to the new list.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::{
    cities::{CitySearch, PageRequest},
    config::DEFAULT_PAGE_SIZE,
    error::FetchError,
    model::City,
    store::WeatherStore,
};

/// Result of one "load next page" attempt.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The page arrived and this many rows were added.
    Loaded(usize),
    /// The page was empty; no further pages will be requested for this query.
    Exhausted,
    /// Nothing was requested: a page is already in flight or the query is exhausted.
    Skipped,
    /// The query changed while the page was in flight; its rows were discarded.
    Stale,
    Failed(FetchError),
}

/// Handed out by [`Paginator::begin_next`], returned to [`Paginator::complete`].
#[derive(Debug, Clone)]
pub struct PageTicket {
    pub request: PageRequest,
    pub token: CancellationToken,
}

#[derive(Debug)]
pub struct Paginator {
    query: String,
    page: u32,
    page_size: u32,
    rows: Vec<City>,
    exhausted: bool,
    in_flight: bool,
    /// Bumped on every query change.
    generation: u64,
    token: CancellationToken,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Paginator {
    pub fn new(page_size: u32) -> Self {
        Self {
            query: String::new(),
            page: 0,
            page_size: page_size.max(1),
            rows: Vec::new(),
            exhausted: false,
            in_flight: false,
            generation: 0,
            token: CancellationToken::new(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Index of the next page to request.
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn rows(&self) -> &[City] {
        &self.rows
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Switch to a new filter. Returns `false` when the query is unchanged.
    ///
    /// A change clears the loaded rows, rewinds to page 0, re-enables
    /// pagination and cancels any outstanding page.
    pub fn set_query(&mut self, query: &str) -> bool {
        if self.query == query {
            return false;
        }

        self.token.cancel();
        self.token = CancellationToken::new();
        self.query = query.to_string();
        self.generation += 1;
        self.page = 0;
        self.rows.clear();
        self.exhausted = false;
        self.in_flight = false;
        true
    }

    /// Reserve the next page, or `None` if one is in flight or the query is exhausted.
    pub fn begin_next(&mut self) -> Option<PageTicket> {
        if self.exhausted || self.in_flight {
            return None;
        }

        self.in_flight = true;
        Some(PageTicket {
            request: PageRequest {
                query: self.query.clone(),
                page: self.page,
                rows: self.page_size,
            },
            token: self.token.clone(),
        })
    }

    /// Give back a reservation whose page never completed.
    ///
    /// Only clears the flag for the current query; a cancelled ticket belongs
    /// to a query that already reset it.
    pub fn release(&mut self, ticket: &PageTicket) {
        if !ticket.token.is_cancelled() {
            self.in_flight = false;
        }
    }

    fn snapshot(&self) -> (u64, Vec<City>) {
        (self.generation, self.rows.clone())
    }

    /// Swap in updated copies of the rows taken by [`Paginator::snapshot`].
    /// Ignored if the query or the row count changed meanwhile.
    fn replace_rows(&mut self, generation: u64, rows: Vec<City>) {
        if generation == self.generation && rows.len() == self.rows.len() {
            self.rows = rows;
        }
    }

    /// Apply the result for a ticket from [`Paginator::begin_next`].
    pub fn complete(
        &mut self,
        ticket: &PageTicket,
        result: Result<Vec<City>, FetchError>,
    ) -> LoadOutcome {
        if ticket.token.is_cancelled() {
            return LoadOutcome::Stale;
        }
        self.in_flight = false;

        let rows = match result {
            Ok(rows) => rows,
            Err(err) => return LoadOutcome::Failed(err),
        };

        if rows.is_empty() {
            self.exhausted = true;
            return LoadOutcome::Exhausted;
        }

        let added = rows.len();
        if ticket.request.page == 0 {
            self.rows = rows;
        } else {
            self.rows.extend(rows);
        }
        self.page = ticket.request.page + 1;

        LoadOutcome::Loaded(added)
    }
}

/// Reservation for one page. Dropping it before [`Reservation::finish`]
/// (e.g. when the `load_next` future is cancelled) releases the in-flight flag.
struct Reservation<'a> {
    state: &'a Mutex<Paginator>,
    ticket: PageTicket,
    finished: bool,
}

impl Reservation<'_> {
    fn finish(mut self, result: Result<Vec<City>, FetchError>) -> LoadOutcome {
        self.finished = true;
        self.state.lock().complete(&self.ticket, result)
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.state.lock().release(&self.ticket);
        }
    }
}

/// Shared controller exposing a single idempotent "load next page" operation.
#[derive(Debug)]
pub struct PaginationController {
    source: Arc<dyn CitySearch>,
    store: Option<Arc<dyn WeatherStore>>,
    state: Mutex<Paginator>,
}

impl PaginationController {
    pub fn new(source: Arc<dyn CitySearch>, page_size: u32) -> Self {
        Self {
            source,
            store: None,
            state: Mutex::new(Paginator::new(page_size)),
        }
    }

    /// Merge cached weather summaries into rows as pages arrive.
    pub fn with_store(mut self, store: Arc<dyn WeatherStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn set_query(&self, query: &str) -> bool {
        let changed = self.state.lock().set_query(query);
        if changed {
            tracing::debug!(query, "search query changed, pagination reset");
        }
        changed
    }

    /// Snapshot of the loaded rows, in server order.
    pub fn rows(&self) -> Vec<City> {
        self.state.lock().rows().to_vec()
    }

    pub fn page(&self) -> u32 {
        self.state.lock().page()
    }

    pub fn is_exhausted(&self) -> bool {
        self.state.lock().is_exhausted()
    }

    pub fn query(&self) -> String {
        self.state.lock().query().to_string()
    }

    /// Fetch and append the next page.
    ///
    /// Calling this while a page is in flight, or after the query ran dry,
    /// does nothing and returns [`LoadOutcome::Skipped`].
    pub async fn load_next(&self) -> LoadOutcome {
        let Some(ticket) = self.state.lock().begin_next() else {
            return LoadOutcome::Skipped;
        };
        let reservation = Reservation {
            state: &self.state,
            ticket: ticket.clone(),
            finished: false,
        };

        let result = tokio::select! {
            _ = ticket.token.cancelled() => return LoadOutcome::Stale,
            result = self.source.search(&ticket.request) => result,
        };

        let result = result.map(|rows| self.merge_cached(rows));
        let outcome = reservation.finish(result);

        match &outcome {
            LoadOutcome::Loaded(n) => {
                tracing::debug!(page = ticket.request.page, rows = n, "city page loaded")
            }
            LoadOutcome::Exhausted => {
                tracing::debug!(page = ticket.request.page, "no more cities for query")
            }
            LoadOutcome::Failed(err) => tracing::error!("Error fetching cities: {err}"),
            LoadOutcome::Stale | LoadOutcome::Skipped => {}
        }

        outcome
    }

    /// Re-apply cached summaries to the rows already loaded, e.g. after a detail visit.
    pub fn refresh_cached(&self) {
        let (generation, rows) = self.state.lock().snapshot();
        let merged = self.merge_cached(rows);
        self.state.lock().replace_rows(generation, merged);
    }

    fn merge_cached(&self, rows: Vec<City>) -> Vec<City> {
        let Some(store) = &self.store else {
            return rows;
        };

        let cached = match store.all() {
            Ok(map) => map,
            Err(err) => {
                tracing::warn!("Ignoring unreadable weather cache: {err:#}");
                return rows;
            }
        };

        rows.into_iter()
            .map(|city| match cached.get(&city.name) {
                Some(summary) => city.with_summary(summary.clone()),
                None => city,
            })
            .collect()
    }
}
