use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred. Please try again.";
pub const CREATE_EVENT_FAILED: &str = "An error occurred while creating the event.";
pub const UPDATE_EVENT_FAILED: &str = "An error occurred while updating the event.";
pub const DELETE_EVENT_FAILED: &str = "An error occurred";
pub const EVENT_CREATED: &str = "Event created successfully";
pub const EVENT_UPDATED: &str = "Event updated successfully";
pub const EVENT_DELETED: &str = "Event deleted successfully";
pub const EVENT_NOT_FOUND: &str = "Event not found";

/// Body of a non-2xx response. Servers send either a single message or a
/// list of validation messages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<ApiErrorMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiErrorMessage {
    Single(String),
    Many(Vec<String>),
}

impl ApiErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(ApiErrorMessage::Single(message.into())),
        }
    }

    /// Message to show verbatim, or `None` when the server sent nothing usable.
    pub fn into_message(self) -> Option<String> {
        let message = match self.message? {
            ApiErrorMessage::Single(message) => message,
            ApiErrorMessage::Many(messages) => messages.join(", "),
        };
        if message.is_empty() {
            None
        } else {
            Some(message)
        }
    }
}

/// Field-level failure produced by draft validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationFailure {
    #[error("Title must be at least 3 characters")]
    TitleTooShort,
    #[error("Address must be at least 3 characters")]
    AddressTooShort,
    #[error("City is required")]
    CityRequired,
    #[error("At least 2 categories must be selected")]
    CategoryMinLength,
    #[error("Event date is required")]
    EventDateRequired,
    #[error("Event date cannot be in the past")]
    EventDateMustBeFuture,
}
