use shared::error::UNEXPECTED_ERROR;
use thiserror::Error;

use crate::validation::ValidationReport;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("draft failed validation: {0}")]
    Validation(ValidationReport),
    #[error("endpoint returned status {status}")]
    Endpoint { status: u16, message: Option<String> },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid api url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ClientError {
    /// Text to show the user. Server-provided messages are used verbatim;
    /// other endpoint failures fall back to `fallback`, and transport or
    /// decode failures to the generic unexpected-error text.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Validation(report) => report.to_string(),
            Self::Endpoint {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Endpoint { message: None, .. } => fallback.to_string(),
            Self::Transport(_) | Self::InvalidUrl(_) => UNEXPECTED_ERROR.to_string(),
        }
    }

    pub fn is_endpoint(&self) -> bool {
        matches!(self, Self::Endpoint { .. })
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
