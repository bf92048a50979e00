//! Create and edit flows on top of [`EventsBackend`].

use chrono::{DateTime, Utc};
use shared::domain::{EventId, EventSummary};
use tracing::info;

use crate::{
    backend::EventsBackend,
    error::{ClientError, ClientResult},
    reference::ReferenceData,
    validation::{validate_draft, EventDraft},
};

/// Validates `draft` against `now` and, only if it passes, creates the event.
pub async fn submit_new_event(
    backend: &dyn EventsBackend,
    draft: &EventDraft,
    now: DateTime<Utc>,
) -> ClientResult<()> {
    let report = validate_draft(draft, now);
    if !report.is_empty() {
        return Err(ClientError::Validation(report));
    }

    backend.create_event(&draft.to_payload()).await?;
    info!(title = %draft.title, "event created");
    Ok(())
}

/// Edit session for an existing event.
#[derive(Debug, Clone)]
pub struct EventEditor {
    event_id: EventId,
    original: EventSummary,
    pub draft: EventDraft,
}

impl EventEditor {
    /// Loads the event and pre-fills the draft. City and categories are
    /// swapped for their reference-data entries when those are known.
    pub async fn load(
        backend: &dyn EventsBackend,
        event_id: &EventId,
        reference: Option<&ReferenceData>,
    ) -> ClientResult<Self> {
        let original = backend.get_event(event_id).await?;
        let draft = draft_from_event(&original, reference);
        Ok(Self {
            event_id: event_id.clone(),
            original,
            draft,
        })
    }

    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    pub fn original(&self) -> &EventSummary {
        &self.original
    }

    /// Sends the draft as a sparse PATCH. Edits are not validated locally.
    pub async fn submit(&self, backend: &dyn EventsBackend) -> ClientResult<()> {
        backend
            .update_event(&self.event_id, &self.draft.to_payload())
            .await?;
        info!(event_id = %self.event_id, "event updated");
        Ok(())
    }
}

pub fn draft_from_event(event: &EventSummary, reference: Option<&ReferenceData>) -> EventDraft {
    let selected_city = event.city.as_ref().map(|city| {
        reference
            .and_then(|reference| reference.city(&city.id))
            .unwrap_or(city)
            .clone()
    });
    let selected_categories = event
        .categories
        .iter()
        .map(|category| {
            reference
                .and_then(|reference| reference.category(&category.id))
                .unwrap_or(category)
                .clone()
        })
        .collect();

    EventDraft {
        title: event.title.clone(),
        address: event.address.clone(),
        selected_city,
        selected_categories,
        event_date: Some(event.event_date),
        description: event.description.clone(),
    }
}

#[cfg(test)]
#[path = "tests/editor_tests.rs"]
mod tests;
