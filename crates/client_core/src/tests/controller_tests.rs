use super::*;

use async_trait::async_trait;
use shared::protocol::{ClientesQuery, ExcelExportQuery, PageEnvelope, PageResponse};
use tokio::sync::{oneshot, Mutex, Notify};

use crate::error::FetchError;

/// In-memory stand-in for the clients endpoint that pages, filters and sorts
/// like the real backend and records every request it receives.
struct TestBackend {
    rows: Mutex<Vec<Cliente>>,
    fail_with_status: Mutex<Option<u16>>,
    bare_arrays: bool,
    calls: Mutex<Vec<ClientesQuery>>,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
    parked: Notify,
}

impl TestBackend {
    fn build(count: i64, bare_arrays: bool) -> Arc<Self> {
        let rows = (1..=count)
            .map(|i| Cliente::new(ClienteId(i), format!("cliente {i:03}")))
            .collect();
        Arc::new(Self {
            rows: Mutex::new(rows),
            fail_with_status: Mutex::new(None),
            bare_arrays,
            calls: Mutex::new(Vec::new()),
            gate: Mutex::new(None),
            parked: Notify::new(),
        })
    }

    fn with_rows(count: i64) -> Arc<Self> {
        Self::build(count, false)
    }

    fn bare(count: i64) -> Arc<Self> {
        Self::build(count, true)
    }

    /// The next request waits until the returned sender fires.
    async fn hold_next_call(&self) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel();
        *self.gate.lock().await = Some(gate);
        release
    }

    async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    async fn last_call(&self) -> ClientesQuery {
        self.calls
            .lock()
            .await
            .last()
            .cloned()
            .expect("at least one backend call")
    }

    async fn remove(&self, id: ClienteId) {
        self.rows.lock().await.retain(|c| c.cliente_id != id);
    }
}

#[async_trait]
impl ClientesBackend for TestBackend {
    async fn list_clientes(
        &self,
        query: &ClientesQuery,
    ) -> Result<PageResponse<Cliente>, FetchError> {
        self.calls.lock().await.push(query.clone());
        let gate = self.gate.lock().await.take();
        if let Some(gate) = gate {
            self.parked.notify_one();
            let _ = gate.await;
        }
        if let Some(status) = *self.fail_with_status.lock().await {
            return Err(FetchError::status(status, "boom"));
        }

        let mut matching: Vec<Cliente> = self
            .rows
            .lock()
            .await
            .iter()
            .filter(|c| match &query.search {
                Some(term) => c.nombre.to_lowercase().contains(&term.to_lowercase()),
                None => true,
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.nombre.cmp(&b.nombre));
        if query.sort_dir == SortDirection::Desc {
            matching.reverse();
        }

        if self.bare_arrays {
            return Ok(PageResponse::Bare(matching));
        }

        let total_elements = matching.len() as u64;
        let total_pages = matching.len().div_ceil(query.size as usize) as u32;
        let content = matching
            .into_iter()
            .skip((query.page * query.size) as usize)
            .take(query.size as usize)
            .collect();
        Ok(PageResponse::Paged(PageEnvelope {
            content,
            total_pages,
            total_elements,
        }))
    }

    async fn export_excel(&self, _query: ExcelExportQuery) -> Result<Vec<u8>, FetchError> {
        Ok(Vec::new())
    }
}

fn controller_for(backend: &Arc<TestBackend>) -> ListController {
    ListController::new(backend.clone())
}

#[tokio::test]
async fn repeated_fetch_is_served_from_cache() {
    let backend = TestBackend::with_rows(25);
    let mut controller = controller_for(&backend);

    controller.fetch_clients(0, "", SortDirection::Asc).await;
    let first = controller.snapshot();
    assert_eq!(backend.call_count().await, 1);
    assert!(controller.cache.contains(&"p0-s-oasc".to_string()));

    controller.fetch_clients(0, "", SortDirection::Asc).await;
    assert_eq!(backend.call_count().await, 1);
    assert_eq!(controller.snapshot().records, first.records);
    assert_eq!(controller.snapshot().pagination, first.pagination);
}

#[tokio::test]
async fn request_encodes_page_size_and_sort_field() {
    let backend = TestBackend::with_rows(3);
    let mut controller = controller_for(&backend);

    controller.fetch_clients(2, "ana", SortDirection::Desc).await;
    let call = backend.last_call().await;
    assert_eq!(call.page, 2);
    assert_eq!(call.size, 10);
    assert_eq!(call.search.as_deref(), Some("ana"));
    assert_eq!(call.sort_by, "nombre");
    assert_eq!(call.sort_dir, SortDirection::Desc);

    controller.fetch_clients(0, "", SortDirection::Asc).await;
    assert_eq!(backend.last_call().await.search, None);
}

#[tokio::test]
async fn bare_array_response_is_normalized() {
    let backend = TestBackend::bare(25);
    let mut controller = controller_for(&backend);

    controller.sync().await;
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.records.len(), 25);
    assert_eq!(snapshot.pagination.total_pages, 3);
    assert_eq!(snapshot.pagination.total_elements, 25);
}

#[tokio::test]
async fn server_error_degrades_to_empty_result() {
    let backend = TestBackend::with_rows(12);
    let mut controller = controller_for(&backend);
    controller.sync().await;
    assert_eq!(controller.snapshot().records.len(), 10);

    *backend.fail_with_status.lock().await = Some(500);
    controller.jump_to(2).await;

    let snapshot = controller.snapshot();
    assert!(snapshot.records.is_empty());
    assert_eq!(snapshot.pagination.total_pages, 0);
    assert_eq!(snapshot.pagination.total_elements, 0);
    assert!(!snapshot.loading);
    assert!(!controller.is_loading());
    assert!(!controller.cache.contains(&"p1-s-oasc".to_string()));
}

#[tokio::test]
async fn sync_only_fetches_when_tuple_changes() {
    let backend = TestBackend::with_rows(30);
    let mut controller = controller_for(&backend);

    assert!(controller.sync().await);
    assert!(!controller.sync().await);
    assert_eq!(backend.call_count().await, 1);

    controller.next_page().await;
    assert_eq!(controller.current_page(), 1);
    assert_eq!(backend.call_count().await, 2);
    assert_eq!(backend.last_call().await.page, 1);
}

#[tokio::test]
async fn pagination_controls_respect_bounds() {
    let backend = TestBackend::with_rows(25);
    let mut controller = controller_for(&backend);
    controller.sync().await;

    controller.previous_page().await;
    assert_eq!(controller.current_page(), 0);

    controller.next_page().await;
    controller.next_page().await;
    controller.next_page().await;
    assert_eq!(controller.current_page(), 2);
    assert_eq!(controller.snapshot().pagination.display_page(), 3);

    // Page 1 was fetched on the way forward, so this is a cache hit.
    controller.jump_to(2).await;
    assert_eq!(controller.current_page(), 1);
    assert_eq!(backend.call_count().await, 3);
    assert_eq!(controller.snapshot().records[0].nombre, "cliente 011");
}

#[tokio::test]
async fn next_page_without_pages_stays_put() {
    let backend = TestBackend::with_rows(0);
    let mut controller = controller_for(&backend);
    controller.sync().await;

    controller.next_page().await;
    assert_eq!(controller.current_page(), 0);
    assert_eq!(backend.call_count().await, 1);
}

#[tokio::test]
async fn deleting_only_row_on_later_page_steps_back() {
    let backend = TestBackend::with_rows(11);
    let mut controller = controller_for(&backend);
    controller.sync().await;
    controller.jump_to(2).await;

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.records.len(), 1);
    let last_id = snapshot.records[0].cliente_id;
    let calls_before = backend.call_count().await;

    backend.remove(last_id).await;
    controller.on_client_deleted(last_id).await;

    assert_eq!(controller.current_page(), 0);
    assert_eq!(backend.call_count().await, calls_before + 1);
    assert_eq!(backend.last_call().await.page, 0);
    assert_eq!(controller.snapshot().records.len(), 10);
    assert_eq!(controller.snapshot().pagination.total_pages, 1);
}

#[tokio::test]
async fn deleting_with_rows_left_reloads_same_page() {
    let backend = TestBackend::with_rows(25);
    let mut controller = controller_for(&backend);
    controller.sync().await;
    controller.jump_to(2).await;

    let victim = controller.snapshot().records[3].cliente_id;
    let calls_before = backend.call_count().await;

    backend.remove(victim).await;
    controller.on_client_deleted(victim).await;

    assert_eq!(controller.current_page(), 1);
    assert_eq!(backend.call_count().await, calls_before + 1);
    assert_eq!(backend.last_call().await.page, 1);
    let snapshot = controller.snapshot();
    assert!(snapshot.records.iter().all(|c| c.cliente_id != victim));
    assert_eq!(snapshot.pagination.total_elements, 24);
}

#[tokio::test]
async fn deleting_only_row_on_first_page_reloads_first_page() {
    let backend = TestBackend::with_rows(1);
    let mut controller = controller_for(&backend);
    controller.sync().await;

    backend.remove(ClienteId(1)).await;
    controller.on_client_deleted(ClienteId(1)).await;

    assert_eq!(controller.current_page(), 0);
    assert_eq!(backend.call_count().await, 2);
    assert!(controller.snapshot().records.is_empty());
}

#[tokio::test]
async fn edit_invalidates_cache_and_reloads() {
    let backend = TestBackend::with_rows(5);
    let mut controller = controller_for(&backend);
    controller.sync().await;
    controller.set_sort(SortDirection::Desc).await;
    assert_eq!(controller.cached_entries(), 2);

    let mut edited = controller.snapshot().records[0].clone();
    edited.nombre = "cliente 005 editado".to_string();
    {
        let mut rows = backend.rows.lock().await;
        let slot = rows
            .iter_mut()
            .find(|c| c.cliente_id == edited.cliente_id)
            .expect("row");
        *slot = edited.clone();
    }

    controller.on_client_saved(edited.clone()).await;
    assert_eq!(backend.call_count().await, 3);
    assert_eq!(controller.cached_entries(), 1);
    assert!(controller.snapshot().records.contains(&edited));
}

#[tokio::test]
async fn edit_is_replaced_by_authoritative_record() {
    let backend = TestBackend::with_rows(3);
    let mut controller = controller_for(&backend);
    controller.sync().await;

    let mut edited = controller.snapshot().records[1].clone();
    edited.nombre = "renombrado".to_string();
    // The backend never saw the rename, so the reload restores its version.
    controller.on_client_saved(edited).await;

    assert_eq!(backend.call_count().await, 2);
    assert_eq!(controller.snapshot().records[1].nombre, "cliente 002");
}

#[tokio::test]
async fn edit_shows_before_reload_finishes() {
    let backend = TestBackend::with_rows(3);
    let mut controller = controller_for(&backend);
    controller.sync().await;
    let mut view = controller.subscribe();

    let mut edited = controller.snapshot().records[1].clone();
    edited.nombre = "renombrado".to_string();
    let release = backend.hold_next_call().await;
    let task = tokio::spawn(async move {
        controller.on_client_saved(edited).await;
        controller
    });

    backend.parked.notified().await;
    {
        let pending = view.borrow_and_update();
        let names: Vec<&str> = pending.records.iter().map(|c| c.nombre.as_str()).collect();
        assert_eq!(names, ["cliente 001", "renombrado", "cliente 003"]);
        assert!(pending.loading);
    }

    release.send(()).expect("reload still waiting");
    let controller = task.await.expect("edit task");
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.records[1].nombre, "cliente 002");
    assert!(!snapshot.loading);
}

#[tokio::test]
async fn delete_hides_row_before_reload_finishes() {
    let backend = TestBackend::with_rows(3);
    let mut controller = controller_for(&backend);
    controller.sync().await;
    let mut view = controller.subscribe();

    backend.remove(ClienteId(2)).await;
    let release = backend.hold_next_call().await;
    let task = tokio::spawn(async move {
        controller.on_client_deleted(ClienteId(2)).await;
        controller
    });

    backend.parked.notified().await;
    {
        let pending = view.borrow_and_update();
        let ids: Vec<ClienteId> = pending.records.iter().map(|c| c.cliente_id).collect();
        assert_eq!(ids, [ClienteId(1), ClienteId(3)]);
        assert!(pending.loading);
    }

    release.send(()).expect("reload still waiting");
    let controller = task.await.expect("delete task");
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.records.len(), 2);
    assert_eq!(snapshot.pagination.total_elements, 2);
    assert_eq!(backend.call_count().await, 2);
}

#[test]
fn display_page_saturates_at_last_page_number() {
    let pagination = Pagination {
        current_page: u32::MAX,
        total_pages: 1,
        total_elements: 1,
    };
    assert_eq!(pagination.display_page(), u32::MAX);
    assert_eq!(Pagination::default().display_page(), 1);
}

#[tokio::test]
async fn create_returns_to_first_page() {
    let backend = TestBackend::with_rows(35);
    let mut controller = controller_for(&backend);
    controller.sync().await;
    controller.jump_to(3).await;
    assert_eq!(controller.cached_entries(), 2);

    controller.on_client_created().await;
    assert_eq!(controller.current_page(), 0);
    assert_eq!(backend.last_call().await.page, 0);
    assert_eq!(controller.cached_entries(), 1);
    assert!(!controller.sync().await);
}

#[tokio::test]
async fn sort_change_resets_page() {
    let backend = TestBackend::with_rows(25);
    let mut controller = controller_for(&backend);
    controller.sync().await;
    controller.jump_to(2).await;

    controller.set_sort(SortDirection::Desc).await;
    assert_eq!(controller.current_page(), 0);
    let call = backend.last_call().await;
    assert_eq!(call.page, 0);
    assert_eq!(call.sort_dir, SortDirection::Desc);
    assert_eq!(controller.snapshot().records[0].nombre, "cliente 025");
}

#[tokio::test(start_paused = true)]
async fn search_applies_after_debounce() {
    let backend = TestBackend::with_rows(25);
    let mut controller = ListController::with_options(
        backend.clone(),
        ListControllerOptions {
            search_debounce: Duration::from_millis(500),
            cache_capacity: 20,
        },
    );
    controller.sync().await;

    controller.set_search_input("cliente 01");
    assert!(!controller.sync().await);

    controller.set_search_input("cliente 012");
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(controller.sync().await);

    assert_eq!(backend.call_count().await, 2);
    assert_eq!(
        backend.last_call().await.search.as_deref(),
        Some("cliente 012")
    );
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.search, "cliente 012");
    assert_eq!(snapshot.records.len(), 1);
}

#[tokio::test]
async fn small_cache_evicts_oldest_page() {
    let backend = TestBackend::with_rows(40);
    let mut controller = ListController::with_options(
        backend.clone(),
        ListControllerOptions {
            search_debounce: Duration::from_millis(10),
            cache_capacity: 2,
        },
    );

    for page in 0..3 {
        controller.fetch_clients(page, "", SortDirection::Asc).await;
    }
    assert_eq!(controller.cached_entries(), 2);
    assert_eq!(backend.call_count().await, 3);

    controller.fetch_clients(2, "", SortDirection::Asc).await;
    assert_eq!(backend.call_count().await, 3);

    controller.fetch_clients(0, "", SortDirection::Asc).await;
    assert_eq!(backend.call_count().await, 4);
}

#[tokio::test]
async fn independent_controllers_do_not_share_cache() {
    let backend = TestBackend::with_rows(5);
    let mut first = controller_for(&backend);
    let mut second = controller_for(&backend);

    first.sync().await;
    second.sync().await;
    assert_eq!(backend.call_count().await, 2);
}
