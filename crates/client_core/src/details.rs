use shared::domain::{EventId, EventSummary};
use tracing::warn;

use crate::{backend::EventsBackend, error::ClientResult};

#[derive(Debug, Clone, PartialEq)]
pub struct EventDetails {
    pub event: EventSummary,
    pub recommended: Vec<EventSummary>,
}

/// Fetches an event and its recommendations together. Only the event itself
/// is required; a failed recommendation lookup yields an empty list.
pub async fn load_event_details(
    backend: &dyn EventsBackend,
    event_id: &EventId,
) -> ClientResult<EventDetails> {
    let (event, recommended) = futures::future::join(
        backend.get_event(event_id),
        backend.recommended_events(event_id),
    )
    .await;

    let event = event?;
    let recommended = recommended.unwrap_or_else(|error| {
        warn!(event_id = %event_id, %error, "failed to fetch recommended events");
        Vec::new()
    });

    Ok(EventDetails { event, recommended })
}
