//! Incremental loading of the coin table.
//!
//! The loader owns the flat row list, the sort state and the pagination
//! cursor. Fetching is split into `begin_*` (decide whether to fetch and
//! mark it in flight) and `complete` (apply the response), so an event loop
//! can run the request elsewhere without holding the loader across an await.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::fetch::MarketApi;
use crate::model::Coin;
use crate::sort::{Column, SortOrder, SortState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Next page at the end of the list.
    Page,
    /// Page 1 again, to keep prices current.
    Refresh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub kind: RequestKind,
    pub page: u32,
    pub per_page: u32,
    pub order: SortOrder,
    pub generation: u64,
}

impl PageRequest {
    pub async fn fetch<A>(&self, api: &A) -> Result<Vec<Coin>, FetchError>
    where
        A: MarketApi + ?Sized,
    {
        api.fetch_markets(self.page, self.per_page, self.order).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    /// Nothing was requested: a page is already in flight or the list is complete.
    Skipped,
    Appended { count: usize, has_more: bool },
    Refreshed { count: usize },
    /// The response belonged to a sort order that is no longer active.
    Stale,
    Failed(FetchError),
}

/// Point-in-time view of the table for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSnapshot {
    pub rows: Vec<Coin>,
    pub sort: SortState,
    pub has_more: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub pages_loaded: u32,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct TableLoader {
    per_page: u32,
    sort: SortState,
    rows: Vec<Coin>,
    /// Rows at the head of `rows` that came from the latest page-1 response.
    first_page_len: usize,
    next_page: u32,
    has_more: bool,
    page_in_flight: bool,
    refresh_in_flight: bool,
    generation: u64,
    error: Option<FetchError>,
    updated_at: Option<DateTime<Utc>>,
}

impl TableLoader {
    pub fn new(per_page: u32) -> Self {
        Self::with_sort(per_page, SortState::default())
    }

    pub fn with_sort(per_page: u32, sort: SortState) -> Self {
        Self {
            per_page: per_page.max(1),
            sort,
            rows: Vec::new(),
            first_page_len: 0,
            next_page: 1,
            has_more: true,
            page_in_flight: false,
            refresh_in_flight: false,
            generation: 0,
            error: None,
            updated_at: None,
        }
    }

    pub fn rows(&self) -> &[Coin] {
        &self.rows
    }

    pub fn sort_state(&self) -> SortState {
        self.sort
    }

    pub fn order(&self) -> SortOrder {
        self.sort.order()
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn next_page(&self) -> u32 {
        self.next_page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.page_in_flight
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Header click. A sortable column toggles or resets direction, drops
    /// every loaded row and rewinds to page 1. Returns false when ignored.
    pub fn set_sort_column(&mut self, column: Column) -> bool {
        if !self.sort.select(column) {
            debug!(?column, "ignoring sort on unsortable column");
            return false;
        }
        self.reset();
        info!(
            column = ?self.sort.column,
            direction = ?self.sort.direction,
            order = %self.order(),
            "sort changed"
        );
        true
    }

    /// Drops loaded rows and starts over from page 1 under a new generation.
    /// Responses to requests issued before the reset are discarded on arrival.
    pub fn reset(&mut self) {
        self.rows.clear();
        self.first_page_len = 0;
        self.next_page = 1;
        self.has_more = true;
        self.page_in_flight = false;
        self.refresh_in_flight = false;
        self.error = None;
        self.generation += 1;
    }

    pub fn begin_next_page(&mut self) -> Option<PageRequest> {
        if self.page_in_flight || !self.has_more {
            return None;
        }
        self.page_in_flight = true;
        self.error = None;
        Some(self.request(RequestKind::Page, self.next_page))
    }

    /// Scroll trigger: the end-of-list sentinel came into view.
    pub fn sentinel_visible(&mut self) -> Option<PageRequest> {
        self.begin_next_page()
    }

    /// Page-1 refetch for the refresh timer. Nothing to refresh until the
    /// first page has landed, and only one refresh runs at a time.
    pub fn begin_refresh(&mut self) -> Option<PageRequest> {
        if self.refresh_in_flight || self.next_page == 1 {
            return None;
        }
        self.refresh_in_flight = true;
        Some(self.request(RequestKind::Refresh, 1))
    }

    fn request(&self, kind: RequestKind, page: u32) -> PageRequest {
        PageRequest {
            kind,
            page,
            per_page: self.per_page,
            order: self.order(),
            generation: self.generation,
        }
    }

    pub fn complete(
        &mut self,
        request: PageRequest,
        result: Result<Vec<Coin>, FetchError>,
    ) -> PageOutcome {
        if request.generation != self.generation {
            debug!(
                page = request.page,
                generation = request.generation,
                current = self.generation,
                "dropping response for superseded sort order"
            );
            return PageOutcome::Stale;
        }
        match request.kind {
            RequestKind::Page => self.complete_page(request, result),
            RequestKind::Refresh => self.complete_refresh(request, result),
        }
    }

    fn complete_page(
        &mut self,
        request: PageRequest,
        result: Result<Vec<Coin>, FetchError>,
    ) -> PageOutcome {
        self.page_in_flight = false;
        match result {
            Ok(coins) => {
                let count = coins.len();
                self.has_more = count >= request.per_page as usize;
                if request.page == 1 {
                    self.first_page_len = count;
                }
                self.rows.extend(coins);
                self.next_page = request.page + 1;
                self.error = None;
                self.updated_at = Some(Utc::now());
                info!(
                    page = request.page,
                    rows = count,
                    total = self.rows.len(),
                    has_more = self.has_more,
                    "page loaded"
                );
                PageOutcome::Appended {
                    count,
                    has_more: self.has_more,
                }
            }
            Err(err) => {
                warn!(page = request.page, error = %err, cause = %err.cause, "page load failed");
                self.error = Some(err.clone());
                PageOutcome::Failed(err)
            }
        }
    }

    fn complete_refresh(
        &mut self,
        request: PageRequest,
        result: Result<Vec<Coin>, FetchError>,
    ) -> PageOutcome {
        self.refresh_in_flight = false;
        match result {
            Ok(coins) => {
                let count = coins.len();
                // With only page 1 loaded the fresh page also decides whether more exist.
                if self.next_page == 2 {
                    self.has_more = count >= request.per_page as usize;
                }
                self.rows.splice(0..self.first_page_len, coins);
                self.first_page_len = count;
                self.error = None;
                self.updated_at = Some(Utc::now());
                debug!(rows = count, "first page refreshed");
                PageOutcome::Refreshed { count }
            }
            Err(err) => {
                warn!(error = %err, cause = %err.cause, "refresh failed");
                self.error = Some(err.clone());
                PageOutcome::Failed(err)
            }
        }
    }

    pub async fn load_next_page<A>(&mut self, api: &A) -> PageOutcome
    where
        A: MarketApi + ?Sized,
    {
        let Some(request) = self.begin_next_page() else {
            return PageOutcome::Skipped;
        };
        let result = request.fetch(api).await;
        self.complete(request, result)
    }

    pub async fn refresh<A>(&mut self, api: &A) -> PageOutcome
    where
        A: MarketApi + ?Sized,
    {
        let Some(request) = self.begin_refresh() else {
            return PageOutcome::Skipped;
        };
        let result = request.fetch(api).await;
        self.complete(request, result)
    }

    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            rows: self.rows.clone(),
            sort: self.sort,
            has_more: self.has_more,
            loading: self.page_in_flight,
            error: self.error.as_ref().map(ToString::to_string),
            pages_loaded: self.next_page - 1,
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Resource;
    use crate::sort::SortDirection;

    fn coins(start: usize, n: usize) -> Vec<Coin> {
        (start..start + n)
            .map(|i| Coin {
                id: format!("coin-{i}"),
                name: format!("Coin {i}"),
                symbol: format!("c{i}"),
                image: String::new(),
                current_price: Some(i as f64),
                market_cap: Some(1e9 - i as f64),
                market_cap_rank: Some(i as u32 + 1),
                total_volume: None,
                price_change_percentage_1h_in_currency: None,
                price_change_percentage_24h_in_currency: None,
                price_change_percentage_7d_in_currency: None,
                sparkline_in_7d: None,
            })
            .collect()
    }

    fn ids(loader: &TableLoader) -> Vec<&str> {
        loader.rows().iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn full_page_means_more_and_short_page_ends() {
        let mut loader = TableLoader::new(100);

        let req = loader.begin_next_page().unwrap();
        assert_eq!(req.page, 1);
        loader.complete(req, Ok(coins(0, 100)));

        let req = loader.begin_next_page().unwrap();
        assert_eq!(req.page, 2);
        let outcome = loader.complete(req, Ok(coins(100, 100)));
        assert_eq!(
            outcome,
            PageOutcome::Appended {
                count: 100,
                has_more: true
            }
        );

        let req = loader.begin_next_page().unwrap();
        assert_eq!(req.page, 3);
        loader.complete(req, Ok(coins(200, 37)));
        assert!(!loader.has_more());
        assert_eq!(loader.rows().len(), 237);
        assert!(loader.begin_next_page().is_none());
    }

    #[test]
    fn short_second_page_ends_the_list() {
        let mut loader = TableLoader::new(100);
        let req = loader.begin_next_page().unwrap();
        loader.complete(req, Ok(coins(0, 100)));
        let req = loader.begin_next_page().unwrap();
        let outcome = loader.complete(req, Ok(coins(100, 37)));
        assert_eq!(
            outcome,
            PageOutcome::Appended {
                count: 37,
                has_more: false
            }
        );
    }

    #[test]
    fn empty_page_ends_the_list() {
        let mut loader = TableLoader::new(10);
        let req = loader.begin_next_page().unwrap();
        loader.complete(req, Ok(Vec::new()));
        assert!(!loader.has_more());
        assert!(loader.rows().is_empty());
    }

    #[test]
    fn one_page_in_flight_at_a_time() {
        let mut loader = TableLoader::new(10);
        let first = loader.begin_next_page().unwrap();
        assert!(loader.is_loading());
        assert!(loader.sentinel_visible().is_none());

        loader.complete(first, Ok(coins(0, 10)));
        assert!(!loader.is_loading());
        assert_eq!(loader.sentinel_visible().map(|r| r.page), Some(2));
    }

    #[test]
    fn pages_append_in_fetch_order() {
        let mut loader = TableLoader::new(2);
        for start in [0, 2, 4] {
            let req = loader.begin_next_page().unwrap();
            loader.complete(req, Ok(coins(start, 2)));
        }
        assert_eq!(
            ids(&loader),
            vec!["coin-0", "coin-1", "coin-2", "coin-3", "coin-4", "coin-5"]
        );
    }

    #[test]
    fn sort_change_clears_rows_and_restarts() {
        let mut loader = TableLoader::new(10);
        let req = loader.begin_next_page().unwrap();
        loader.complete(req, Ok(coins(0, 10)));
        assert_eq!(loader.next_page(), 2);

        assert!(loader.set_sort_column(Column::Volume));
        assert!(loader.rows().is_empty());
        assert_eq!(loader.next_page(), 1);
        assert!(loader.has_more());

        let req = loader.begin_next_page().unwrap();
        assert_eq!(req.page, 1);
        assert_eq!(req.order, SortOrder::VolumeAsc);
    }

    #[test]
    fn unsortable_column_keeps_rows() {
        let mut loader = TableLoader::new(10);
        let req = loader.begin_next_page().unwrap();
        loader.complete(req, Ok(coins(0, 10)));

        assert!(!loader.set_sort_column(Column::Change24h));
        assert_eq!(loader.rows().len(), 10);
        assert_eq!(loader.sort_state(), SortState::default());
    }

    #[test]
    fn response_after_sort_change_is_dropped() {
        let mut loader = TableLoader::new(10);
        let old = loader.begin_next_page().unwrap();

        loader.set_sort_column(Column::MarketCap);
        assert_eq!(loader.sort_state().direction, SortDirection::Asc);
        let fresh = loader.begin_next_page().unwrap();

        assert_eq!(loader.complete(old, Ok(coins(0, 10))), PageOutcome::Stale);
        assert!(loader.rows().is_empty());
        assert!(loader.is_loading());

        loader.complete(fresh, Ok(coins(50, 10)));
        assert_eq!(loader.rows()[0].id, "coin-50");
    }

    #[test]
    fn failure_sets_error_and_keeps_offset() {
        let mut loader = TableLoader::new(10);
        let req = loader.begin_next_page().unwrap();
        loader.complete(req, Ok(coins(0, 10)));

        let req = loader.begin_next_page().unwrap();
        let outcome = loader.complete(req, Err(FetchError::new(Resource::Markets, "timeout")));
        assert!(matches!(outcome, PageOutcome::Failed(_)));
        assert_eq!(
            loader.snapshot().error.as_deref(),
            Some("Failed to fetch data")
        );
        assert_eq!(loader.rows().len(), 10);
        assert!(loader.has_more());

        let retry = loader.begin_next_page().unwrap();
        assert_eq!(retry.page, 2);
        assert!(loader.error().is_none());
    }

    #[test]
    fn refresh_replaces_first_page_without_moving_offset() {
        let mut loader = TableLoader::new(3);
        assert!(loader.begin_refresh().is_none());

        for start in [0, 3] {
            let req = loader.begin_next_page().unwrap();
            loader.complete(req, Ok(coins(start, 3)));
        }

        let req = loader.begin_refresh().unwrap();
        assert_eq!(req.page, 1);
        assert_eq!(req.kind, RequestKind::Refresh);
        assert!(loader.begin_refresh().is_none());

        let mut fresh = coins(0, 3);
        fresh[0].current_price = Some(999.0);
        assert_eq!(
            loader.complete(req, Ok(fresh)),
            PageOutcome::Refreshed { count: 3 }
        );

        assert_eq!(loader.rows().len(), 6);
        assert_eq!(loader.rows()[0].current_price, Some(999.0));
        assert_eq!(loader.rows()[3].id, "coin-3");
        assert_eq!(loader.next_page(), 3);
    }

    #[test]
    fn refresh_of_single_page_updates_has_more() {
        let mut loader = TableLoader::new(3);
        let req = loader.begin_next_page().unwrap();
        loader.complete(req, Ok(coins(0, 2)));
        assert!(!loader.has_more());

        let req = loader.begin_refresh().unwrap();
        loader.complete(req, Ok(coins(0, 3)));
        assert!(loader.has_more());
        assert_eq!(loader.rows().len(), 3);
    }

    #[test]
    fn successful_refresh_clears_earlier_refresh_error() {
        let mut loader = TableLoader::new(10);
        let req = loader.begin_next_page().unwrap();
        loader.complete(req, Ok(coins(0, 5)));
        assert!(!loader.has_more());

        let req = loader.begin_refresh().unwrap();
        loader.complete(req, Err(FetchError::new(Resource::Markets, "503")));
        assert!(loader.error().is_some());

        let req = loader.begin_refresh().unwrap();
        assert_eq!(
            loader.complete(req, Ok(coins(0, 5))),
            PageOutcome::Refreshed { count: 5 }
        );
        assert!(loader.error().is_none());
        assert!(loader.snapshot().error.is_none());
    }

    #[test]
    fn short_refresh_never_reaches_into_later_pages() {
        let mut loader = TableLoader::new(3);
        for start in [0, 3] {
            let req = loader.begin_next_page().unwrap();
            loader.complete(req, Ok(coins(start, 3)));
        }

        for _ in 0..2 {
            let req = loader.begin_refresh().unwrap();
            loader.complete(req, Ok(coins(0, 2)));
        }

        assert_eq!(ids(&loader), vec!["coin-0", "coin-1", "coin-3", "coin-4", "coin-5"]);
        assert_eq!(loader.next_page(), 3);
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut loader = TableLoader::new(5);
        let req = loader.begin_next_page().unwrap();
        assert!(loader.snapshot().loading);
        loader.complete(req, Ok(coins(0, 5)));

        let snap = loader.snapshot();
        assert_eq!(snap.rows.len(), 5);
        assert_eq!(snap.pages_loaded, 1);
        assert!(!snap.loading);
        assert!(snap.updated_at.is_some());
        assert!(snap.error.is_none());
    }
}
