//! Client engine for the events API: listing pipeline, draft validation,
//! create/edit/delete flows and reference data.

pub mod backend;
pub mod config;
pub mod details;
pub mod editor;
pub mod error;
pub mod format;
pub mod query;
pub mod reference;
pub mod validation;

#[cfg(test)]
mod testing;

pub use backend::{EventsBackend, HttpEventsClient};
pub use config::{load_settings, ClientSettings};
pub use details::{load_event_details, EventDetails};
pub use editor::{submit_new_event, EventEditor};
pub use error::{ClientError, ClientResult};
pub use query::{
    build_list_request, FilterState, QueryController, QueryEvent, QueryPhase, ResultPage,
};
pub use reference::ReferenceData;
pub use validation::{validate_draft, DraftField, EventDraft, ValidationReport};
