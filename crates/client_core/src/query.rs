//! Debounced listing pipeline behind the event search screen.
//!
//! Every filter, sort or page change restarts a quiet-period timer. When the
//! timer runs out the current [`FilterState`] is turned into a sparse
//! [`ListEventsRequest`] and sent; a successful response replaces the held
//! [`ResultPage`] wholesale. Requests are never cancelled once sent, but each
//! carries a sequence number and only the most recently issued one may
//! publish its response.

use std::{collections::BTreeSet, sync::Arc, time::Duration};

use shared::{
    domain::{CategoryId, CityId, EventId, EventSummary, SortKey},
    error::{DELETE_EVENT_FAILED, UNEXPECTED_ERROR},
    protocol::ListEventsRequest,
};
use tokio::{
    sync::{broadcast, Mutex, OnceCell},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    backend::EventsBackend,
    config::ClientSettings,
    error::ClientResult,
    reference::ReferenceData,
};

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(500);

/// User-controlled listing parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub title_query: String,
    pub selected_city_ids: BTreeSet<CityId>,
    pub selected_category_ids: BTreeSet<CategoryId>,
    pub sort_key: Option<SortKey>,
    page_number: u32,
    page_size: u32,
}

impl FilterState {
    pub fn new(page_size: u32) -> Self {
        Self {
            title_query: String::new(),
            selected_city_ids: BTreeSet::new(),
            selected_category_ids: BTreeSet::new(),
            sort_key: None,
            page_number: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Steps back one page. Returns `false` on page 1, where nothing changes.
    pub fn previous_page(&mut self) -> bool {
        if self.page_number > 1 {
            self.page_number -= 1;
            true
        } else {
            false
        }
    }

    /// No upper bound: the server does not report a page count.
    pub fn next_page(&mut self) {
        self.page_number = self.page_number.saturating_add(1);
    }
}

/// Builds the listing body, leaving out every empty field.
pub fn build_list_request(filter: &FilterState) -> ListEventsRequest {
    ListEventsRequest {
        page_size: filter.page_size,
        page_number: filter.page_number,
        title: (!filter.title_query.is_empty()).then(|| filter.title_query.clone()),
        city_ids: filter.selected_city_ids.iter().cloned().collect(),
        category_ids: filter.selected_category_ids.iter().cloned().collect(),
        sort_by: filter.sort_key,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultPage {
    pub items: Vec<EventSummary>,
    pub page_number: u32,
}

impl ResultPage {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPhase {
    Idle,
    PendingDebounce,
    Fetching,
}

#[derive(Debug, Clone)]
pub enum QueryEvent {
    ResultsUpdated(ResultPage),
    QueryFailed(String),
    EventDeleted(EventId),
}

struct ControllerState {
    filter: FilterState,
    phase: QueryPhase,
    results: ResultPage,
    pending: Option<JoinHandle<()>>,
    debounce_generation: u64,
    last_issued: u64,
}

pub struct QueryController {
    backend: Arc<dyn EventsBackend>,
    quiet_period: Duration,
    inner: Mutex<ControllerState>,
    reference: OnceCell<ReferenceData>,
    events: broadcast::Sender<QueryEvent>,
}

impl QueryController {
    pub fn new(backend: Arc<dyn EventsBackend>, page_size: u32) -> Arc<Self> {
        Self::with_quiet_period(backend, page_size, DEFAULT_QUIET_PERIOD)
    }

    pub fn from_settings(backend: Arc<dyn EventsBackend>, settings: &ClientSettings) -> Arc<Self> {
        Self::with_quiet_period(backend, settings.page_size, settings.quiet_period())
    }

    pub fn with_quiet_period(
        backend: Arc<dyn EventsBackend>,
        page_size: u32,
        quiet_period: Duration,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            backend,
            quiet_period,
            inner: Mutex::new(ControllerState {
                filter: FilterState::new(page_size),
                phase: QueryPhase::Idle,
                results: ResultPage {
                    items: Vec::new(),
                    page_number: 1,
                },
                pending: None,
                debounce_generation: 0,
                last_issued: 0,
            }),
            reference: OnceCell::new(),
            events,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QueryEvent> {
        self.events.subscribe()
    }

    /// Loads reference data on first call only, then schedules the initial
    /// listing through the normal debounce path.
    pub async fn activate(self: &Arc<Self>) -> ReferenceData {
        let reference = self
            .reference
            .get_or_init(|| ReferenceData::fetch_lenient(self.backend.as_ref()))
            .await
            .clone();

        let mut state = self.inner.lock().await;
        self.schedule_locked(&mut state);
        reference
    }

    /// Cancels a pending debounce. A request already on the wire is left to
    /// finish.
    pub async fn shutdown(&self) {
        let mut state = self.inner.lock().await;
        state.debounce_generation += 1;
        if let Some(pending) = state.pending.take() {
            pending.abort();
        }
        if state.phase == QueryPhase::PendingDebounce {
            state.phase = QueryPhase::Idle;
        }
    }

    pub fn reference_data(&self) -> Option<&ReferenceData> {
        self.reference.get()
    }

    pub async fn filter(&self) -> FilterState {
        self.inner.lock().await.filter.clone()
    }

    pub async fn results(&self) -> ResultPage {
        self.inner.lock().await.results.clone()
    }

    pub async fn phase(&self) -> QueryPhase {
        self.inner.lock().await.phase
    }

    pub async fn set_title_query(self: &Arc<Self>, title: impl Into<String>) {
        let title = title.into();
        self.update(|filter| filter.title_query = title).await;
    }

    pub async fn set_city_ids(self: &Arc<Self>, ids: impl IntoIterator<Item = CityId>) {
        let ids: BTreeSet<CityId> = ids.into_iter().collect();
        self.update(|filter| filter.selected_city_ids = ids).await;
    }

    pub async fn set_category_ids(self: &Arc<Self>, ids: impl IntoIterator<Item = CategoryId>) {
        let ids: BTreeSet<CategoryId> = ids.into_iter().collect();
        self.update(|filter| filter.selected_category_ids = ids).await;
    }

    pub async fn toggle_city(self: &Arc<Self>, id: CityId) {
        self.update(|filter| {
            if !filter.selected_city_ids.remove(&id) {
                filter.selected_city_ids.insert(id);
            }
        })
        .await;
    }

    pub async fn toggle_category(self: &Arc<Self>, id: CategoryId) {
        self.update(|filter| {
            if !filter.selected_category_ids.remove(&id) {
                filter.selected_category_ids.insert(id);
            }
        })
        .await;
    }

    pub async fn set_sort_key(self: &Arc<Self>, sort_key: Option<SortKey>) {
        self.update(|filter| filter.sort_key = sort_key).await;
    }

    pub async fn previous_page(self: &Arc<Self>) -> u32 {
        self.update(|filter| {
            filter.previous_page();
        })
        .await
        .page_number
    }

    pub async fn next_page(self: &Arc<Self>) -> u32 {
        self.update(FilterState::next_page).await.page_number
    }

    /// Deletes on the server, then drops the entry from the held page
    /// without refetching. On failure the page is left untouched and the
    /// error is returned for display.
    pub async fn delete_event(&self, event_id: &EventId) -> ClientResult<()> {
        if let Err(error) = self.backend.delete_event(event_id).await {
            warn!(
                event_id = %event_id,
                error = %error,
                message = %error.user_message(DELETE_EVENT_FAILED),
                "failed to delete event"
            );
            return Err(error);
        }

        let mut state = self.inner.lock().await;
        state.results.items.retain(|event| &event.id != event_id);
        info!(event_id = %event_id, "event deleted");
        let _ = self.events.send(QueryEvent::EventDeleted(event_id.clone()));
        Ok(())
    }

    /// Applies `mutate` and restarts the quiet period if the filter changed.
    async fn update(self: &Arc<Self>, mutate: impl FnOnce(&mut FilterState)) -> FilterState {
        let mut state = self.inner.lock().await;
        let before = state.filter.clone();
        mutate(&mut state.filter);
        if state.filter != before {
            self.schedule_locked(&mut state);
        }
        state.filter.clone()
    }

    fn schedule_locked(self: &Arc<Self>, state: &mut ControllerState) {
        if let Some(pending) = state.pending.take() {
            pending.abort();
        }
        state.debounce_generation += 1;
        state.phase = QueryPhase::PendingDebounce;

        let generation = state.debounce_generation;
        let controller = Arc::clone(self);
        state.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(controller.quiet_period).await;
            controller.fire(generation).await;
        }));
    }

    async fn fire(self: Arc<Self>, generation: u64) {
        let (sequence, request) = {
            let mut state = self.inner.lock().await;
            if state.debounce_generation != generation {
                return;
            }
            state.pending = None;
            state.phase = QueryPhase::Fetching;
            state.last_issued += 1;
            (state.last_issued, build_list_request(&state.filter))
        };

        debug!(
            sequence,
            page = request.page_number,
            "dispatching event listing"
        );
        // Detached so a later change cannot cancel a request already sent.
        tokio::spawn(self.run_fetch(sequence, request));
    }

    async fn run_fetch(self: Arc<Self>, sequence: u64, request: ListEventsRequest) {
        let outcome = self.backend.list_events(&request).await;

        let mut state = self.inner.lock().await;
        if sequence != state.last_issued {
            debug!(
                sequence,
                latest = state.last_issued,
                "discarding stale listing response"
            );
            return;
        }
        state.phase = if state.pending.is_some() {
            QueryPhase::PendingDebounce
        } else {
            QueryPhase::Idle
        };

        match outcome {
            Ok(items) => {
                state.results = ResultPage {
                    items,
                    page_number: request.page_number,
                };
                let _ = self
                    .events
                    .send(QueryEvent::ResultsUpdated(state.results.clone()));
            }
            Err(error) => {
                warn!(sequence, %error, "event listing failed; keeping previous results");
                let _ = self
                    .events
                    .send(QueryEvent::QueryFailed(error.user_message(UNEXPECTED_ERROR)));
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/query_tests.rs"]
mod tests;
