//! In-memory [`EventsBackend`] used by unit tests.

use std::{collections::VecDeque, sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use shared::{
    domain::{CategoryId, CategoryRef, CityId, CityRef, EventId, EventSummary},
    protocol::{EventPayload, ListEventsRequest},
};
use tokio::sync::Mutex;

use crate::{
    backend::EventsBackend,
    error::{ClientError, ClientResult},
};

pub fn event(id: &str, title: &str) -> EventSummary {
    EventSummary {
        id: EventId::new(id),
        title: title.to_string(),
        description: format!("{title} description"),
        address: "1 Freedom Square".to_string(),
        event_date: Utc
            .with_ymd_and_hms(2026, 11, 2, 18, 30, 0)
            .single()
            .expect("valid timestamp"),
        city: Some(city("c1", "Tbilisi")),
        categories: vec![category("k1", "Music"), category("k2", "Outdoor")],
    }
}

pub fn city(id: &str, name: &str) -> CityRef {
    CityRef {
        id: CityId::new(id),
        name: name.to_string(),
    }
}

pub fn category(id: &str, name: &str) -> CategoryRef {
    CategoryRef {
        id: CategoryId::new(id),
        name: name.to_string(),
    }
}

pub fn endpoint_error(status: u16, message: Option<&str>) -> ClientError {
    ClientError::Endpoint {
        status,
        message: message.map(str::to_string),
    }
}

/// One scripted listing reply: optional latency, then the outcome.
pub struct ListingReply {
    pub delay: Duration,
    pub outcome: ClientResult<Vec<EventSummary>>,
}

impl ListingReply {
    pub fn ok(items: Vec<EventSummary>) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Ok(items),
        }
    }

    pub fn failing(error: ClientError) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Err(error),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Default)]
pub struct FakeBackend {
    pub listing_requests: Mutex<Vec<ListEventsRequest>>,
    pub listing_replies: Mutex<VecDeque<ListingReply>>,
    pub created: Mutex<Vec<EventPayload>>,
    pub updated: Mutex<Vec<(EventId, EventPayload)>>,
    pub deleted: Mutex<Vec<EventId>>,
    pub mutation_error: Mutex<Option<ClientError>>,
    pub events: Mutex<Vec<EventSummary>>,
    pub recommended: Mutex<Option<ClientResult<Vec<EventSummary>>>>,
    pub cities: Vec<CityRef>,
    pub categories: Vec<CategoryRef>,
    pub reference_calls: Mutex<u32>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::with_reference())
    }

    pub fn with_reference() -> Self {
        Self {
            cities: vec![city("c1", "Tbilisi"), city("c2", "Batumi")],
            categories: vec![
                category("k1", "Music"),
                category("k2", "Outdoor"),
                category("k3", "Food"),
            ],
            ..Self::default()
        }
    }

    pub async fn push_reply(&self, reply: ListingReply) {
        self.listing_replies.lock().await.push_back(reply);
    }

    pub async fn fail_mutations_with(&self, error: ClientError) {
        *self.mutation_error.lock().await = Some(error);
    }

    pub async fn requests(&self) -> Vec<ListEventsRequest> {
        self.listing_requests.lock().await.clone()
    }

    async fn take_mutation_error(&self) -> ClientResult<()> {
        match self.mutation_error.lock().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl EventsBackend for FakeBackend {
    async fn list_events(&self, request: &ListEventsRequest) -> ClientResult<Vec<EventSummary>> {
        self.listing_requests.lock().await.push(request.clone());
        let reply = self
            .listing_replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| ListingReply::ok(Vec::new()));
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.outcome
    }

    async fn get_event(&self, event_id: &EventId) -> ClientResult<EventSummary> {
        self.events
            .lock()
            .await
            .iter()
            .find(|event| &event.id == event_id)
            .cloned()
            .ok_or_else(|| endpoint_error(404, Some("Event not found")))
    }

    async fn recommended_events(&self, _event_id: &EventId) -> ClientResult<Vec<EventSummary>> {
        self.recommended
            .lock()
            .await
            .take()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn create_event(&self, payload: &EventPayload) -> ClientResult<()> {
        self.take_mutation_error().await?;
        self.created.lock().await.push(payload.clone());
        Ok(())
    }

    async fn update_event(&self, event_id: &EventId, payload: &EventPayload) -> ClientResult<()> {
        self.take_mutation_error().await?;
        self.updated
            .lock()
            .await
            .push((event_id.clone(), payload.clone()));
        Ok(())
    }

    async fn delete_event(&self, event_id: &EventId) -> ClientResult<()> {
        self.take_mutation_error().await?;
        self.deleted.lock().await.push(event_id.clone());
        Ok(())
    }

    async fn list_cities(&self) -> ClientResult<Vec<CityRef>> {
        *self.reference_calls.lock().await += 1;
        Ok(self.cities.clone())
    }

    async fn list_categories(&self) -> ClientResult<Vec<CategoryRef>> {
        *self.reference_calls.lock().await += 1;
        Ok(self.categories.clone())
    }
}
