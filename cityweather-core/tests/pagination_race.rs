//! Query changes while a page request is still outstanding.

use std::sync::Arc;
use std::time::Duration;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use cityweather_core::{
    City, CitySearch, Coordinates, FetchError, LoadOutcome, PageRequest, PaginationController,
};
use tokio::sync::Notify;

/// Source whose "slow" query blocks until released.
#[derive(Debug, Default)]
struct GatedSource {
    started: Notify,
    release: Notify,
    calls: AtomicUsize,
}

#[async_trait]
impl CitySearch for GatedSource {
    async fn search(&self, request: &PageRequest) -> Result<Vec<City>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if request.query == "slow" {
            self.started.notify_one();
            self.release.notified().await;
        }

        let name = format!("{}-{}", request.query, request.page);
        Ok(vec![City {
            id: name.clone(),
            name,
            country: None,
            timezone: None,
            coordinates: Coordinates::new(0.0, 0.0),
            population: 1,
            weather: None,
        }])
    }
}

#[tokio::test]
async fn test_second_load_while_in_flight_is_skipped() {
    let source = Arc::new(GatedSource::default());
    let controller = Arc::new(PaginationController::new(source.clone(), 20));
    controller.set_query("slow");

    let pending = tokio::spawn({
        let controller = controller.clone();
        async move { controller.load_next().await }
    });
    source.started.notified().await;

    assert!(matches!(controller.load_next().await, LoadOutcome::Skipped));
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);

    source.release.notify_one();
    assert!(matches!(pending.await.unwrap(), LoadOutcome::Loaded(1)));
    assert_eq!(controller.rows()[0].name, "slow-0");
}

#[tokio::test]
async fn test_query_change_cancels_outstanding_page() {
    let source = Arc::new(GatedSource::default());
    let controller = Arc::new(PaginationController::new(source.clone(), 20));
    controller.set_query("slow");

    let pending = tokio::spawn({
        let controller = controller.clone();
        async move { controller.load_next().await }
    });
    source.started.notified().await;

    assert!(controller.set_query("fast"));
    assert!(matches!(pending.await.unwrap(), LoadOutcome::Stale));

    assert!(matches!(controller.load_next().await, LoadOutcome::Loaded(1)));
    let rows = controller.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "fast-0");
    assert_eq!(controller.page(), 1);
}

#[tokio::test]
async fn test_abandoned_load_releases_in_flight_page() {
    let source = Arc::new(GatedSource::default());
    let controller = PaginationController::new(source.clone(), 20);
    controller.set_query("slow");

    let timed_out =
        tokio::time::timeout(Duration::from_millis(10), controller.load_next()).await;
    assert!(timed_out.is_err());

    // The abandoned request never completed, so the same page is asked for again.
    let retry = tokio::spawn({
        let source = source.clone();
        async move {
            source.started.notified().await;
            source.release.notify_one();
        }
    });
    assert!(matches!(controller.load_next().await, LoadOutcome::Loaded(1)));
    retry.await.unwrap();

    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    assert_eq!(controller.rows()[0].name, "slow-0");
    assert_eq!(controller.page(), 1);
}
