use std::{sync::Arc, time::Duration};

use shared::{
    domain::{ClienteId, SortDirection, PAGE_SIZE},
    protocol::{Cliente, ListPage},
};
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::{
    cache::{QueryCache, DEFAULT_CACHE_CAPACITY},
    debounce::{Debouncer, DEFAULT_SEARCH_DEBOUNCE},
    query::QueryKey,
    ClientesBackend,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pagination {
    /// Zero-indexed, as the backend counts pages.
    pub current_page: u32,
    pub total_pages: u32,
    pub total_elements: u64,
}

impl Pagination {
    pub fn display_page(&self) -> u32 {
        self.current_page.saturating_add(1)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListSnapshot {
    pub records: Vec<Cliente>,
    pub pagination: Pagination,
    pub loading: bool,
    pub search: String,
    pub sort: SortDirection,
}

#[derive(Debug, Clone, Copy)]
pub struct ListControllerOptions {
    pub search_debounce: Duration,
    pub cache_capacity: usize,
}

impl Default for ListControllerOptions {
    fn default() -> Self {
        Self {
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// Owns the query state for one client table.
///
/// All operations take `&mut self`, so fetches issued through one controller
/// never overlap and a late response cannot overwrite a newer one.
pub struct ListController {
    backend: Arc<dyn ClientesBackend>,
    cache: QueryCache<String, ListPage<Cliente>>,
    search: Debouncer<String>,
    current_page: u32,
    sort: SortDirection,
    last_requested: Option<QueryKey>,
    view: watch::Sender<ListSnapshot>,
}

impl ListController {
    pub fn new(backend: Arc<dyn ClientesBackend>) -> Self {
        Self::with_options(backend, ListControllerOptions::default())
    }

    pub fn with_options(backend: Arc<dyn ClientesBackend>, options: ListControllerOptions) -> Self {
        let (view, _) = watch::channel(ListSnapshot::default());
        Self {
            backend,
            cache: QueryCache::with_capacity(options.cache_capacity),
            search: Debouncer::new(String::new(), options.search_debounce),
            current_page: 0,
            sort: SortDirection::Asc,
            last_requested: None,
            view,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot> {
        self.view.subscribe()
    }

    pub fn snapshot(&self) -> ListSnapshot {
        self.view.borrow().clone()
    }

    pub fn search_updates(&self) -> watch::Receiver<String> {
        self.search.subscribe()
    }

    pub fn current_query(&self) -> QueryKey {
        QueryKey::new(self.current_page, self.search.current(), self.sort)
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn sort(&self) -> SortDirection {
        self.sort
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    pub fn is_loading(&self) -> bool {
        self.view.borrow().loading
    }

    /// Serves `(page, search, sort)` from the cache or the backend and
    /// publishes the result. Failures degrade to an empty page.
    pub async fn fetch_clients(&mut self, page: u32, search: &str, sort: SortDirection) {
        let key = QueryKey::new(page, search, sort);
        let cache_key = key.cache_key();
        self.last_requested = Some(key.clone());

        if let Some(cached) = self.cache.lookup(&cache_key).cloned() {
            debug!(%cache_key, "client list cache hit");
            self.publish_page(&key, cached);
            return;
        }

        info!(page, search, %sort, "client list cache miss, querying backend");
        self.view.send_modify(|view| view.loading = true);

        match self.backend.list_clientes(&key.to_request()).await {
            Ok(response) => {
                let page = response.normalize(PAGE_SIZE);
                info!(
                    rows = page.records.len(),
                    total_pages = page.total_pages,
                    total_elements = page.total_elements,
                    "client list fetched"
                );
                self.publish_page(&key, page.clone());
                self.cache.insert(cache_key, page);
            }
            Err(err) => {
                error!(error = %err, code = ?err.code(), page, "failed to load clients");
                self.publish_page(&key, ListPage::empty());
            }
        }

        self.view.send_modify(|view| view.loading = false);
    }

    /// Re-runs the fetch when the (page, debounced search, sort) tuple differs
    /// from the last one requested. Returns whether a fetch was issued.
    pub async fn sync(&mut self) -> bool {
        let query = self.current_query();
        if self.last_requested.as_ref() == Some(&query) {
            return false;
        }
        debug!(page = query.page, search = %query.search, sort = %query.sort, "query changed");
        self.fetch_clients(query.page, &query.search, query.sort)
            .await;
        true
    }

    pub async fn refresh(&mut self) {
        let query = self.current_query();
        self.fetch_clients(query.page, &query.search, query.sort)
            .await;
    }

    pub fn set_search_input(&mut self, text: impl Into<String>) {
        self.search.push(text.into());
    }

    pub async fn set_sort(&mut self, sort: SortDirection) {
        info!(from = %self.sort, to = %sort, "sort order changed");
        self.sort = sort;
        self.current_page = 0;
        self.publish_state();
        self.sync().await;
    }

    pub async fn previous_page(&mut self) {
        self.current_page = self.current_page.saturating_sub(1);
        self.publish_state();
        self.sync().await;
    }

    /// Stays put while there are no pages at all.
    pub async fn next_page(&mut self) {
        let total_pages = self.view.borrow().pagination.total_pages;
        if total_pages > 0 {
            self.current_page = (self.current_page + 1).min(total_pages - 1);
        }
        self.publish_state();
        self.sync().await;
    }

    pub async fn jump_to(&mut self, page_number: u32) {
        self.current_page = page_number.saturating_sub(1);
        self.publish_state();
        self.sync().await;
    }

    pub fn invalidate_cache(&mut self) {
        self.cache.clear();
    }

    pub async fn on_client_saved(&mut self, updated: Cliente) {
        let cliente_id = updated.cliente_id;
        info!(%cliente_id, "client edited");
        self.view.send_modify(|view| {
            if let Some(slot) = view.records.iter_mut().find(|c| c.cliente_id == cliente_id) {
                *slot = updated;
            }
        });
        self.invalidate_cache();
        self.refresh().await;
    }

    /// Drops the record locally; when it emptied a page past the first, steps
    /// back one page, otherwise reloads the current one.
    pub async fn on_client_deleted(&mut self, cliente_id: ClienteId) {
        info!(%cliente_id, "client deleted");
        let mut emptied_page = false;
        self.view.send_modify(|view| {
            let before = view.records.len();
            view.records.retain(|c| c.cliente_id != cliente_id);
            emptied_page = before == 1 && view.records.is_empty();
        });
        self.invalidate_cache();

        if emptied_page && self.current_page > 0 {
            debug!(page = self.current_page, "last row of page removed, stepping back");
            self.current_page -= 1;
            self.publish_state();
            self.sync().await;
        } else {
            self.refresh().await;
        }
    }

    pub async fn on_client_created(&mut self) {
        info!("client created");
        self.invalidate_cache();
        self.current_page = 0;
        self.publish_state();
        self.refresh().await;
    }

    fn publish_page(&self, key: &QueryKey, page: ListPage<Cliente>) {
        self.view.send_modify(|view| {
            view.records = page.records;
            view.pagination = Pagination {
                current_page: key.page,
                total_pages: page.total_pages,
                total_elements: page.total_elements,
            };
            view.search = key.search.clone();
            view.sort = key.sort;
        });
    }

    fn publish_state(&self) {
        let current_page = self.current_page;
        let sort = self.sort;
        self.view.send_modify(|view| {
            view.pagination.current_page = current_page;
            view.sort = sort;
        });
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
