//! HTTP access to the events API.

use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::{CategoryRef, CityRef, EventId, EventSummary},
    error::ApiErrorBody,
    protocol::{EventPayload, ListEventsRequest},
};
use tracing::debug;
use url::Url;

use crate::error::{ClientError, ClientResult};

/// Remote operations the client engine depends on.
#[async_trait]
pub trait EventsBackend: Send + Sync {
    async fn list_events(&self, request: &ListEventsRequest) -> ClientResult<Vec<EventSummary>>;
    async fn get_event(&self, event_id: &EventId) -> ClientResult<EventSummary>;
    async fn recommended_events(&self, event_id: &EventId) -> ClientResult<Vec<EventSummary>>;
    async fn create_event(&self, payload: &EventPayload) -> ClientResult<()>;
    async fn update_event(&self, event_id: &EventId, payload: &EventPayload) -> ClientResult<()>;
    async fn delete_event(&self, event_id: &EventId) -> ClientResult<()>;
    async fn list_cities(&self) -> ClientResult<Vec<CityRef>>;
    async fn list_categories(&self) -> ClientResult<Vec<CategoryRef>>;
}

pub struct HttpEventsClient {
    http: Client,
    base_url: Url,
}

impl HttpEventsClient {
    pub fn new(api_base_url: &str) -> ClientResult<Self> {
        Self::with_client(Client::new(), api_base_url)
    }

    pub fn with_client(http: Client, api_base_url: &str) -> ClientResult<Self> {
        let base_url = Url::parse(api_base_url.trim())?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Passes 2xx responses through; anything else becomes
/// [`ClientError::Endpoint`] carrying the server's `message`, if any.
async fn ensure_success(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.bytes().await {
        Ok(body) => serde_json::from_slice::<ApiErrorBody>(&body)
            .ok()
            .and_then(ApiErrorBody::into_message),
        Err(_) => None,
    };
    Err(ClientError::Endpoint {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl EventsBackend for HttpEventsClient {
    async fn list_events(&self, request: &ListEventsRequest) -> ClientResult<Vec<EventSummary>> {
        let url = self.endpoint(&["events", "list"])?;
        debug!(
            page = request.page_number,
            page_size = request.page_size,
            "listing events"
        );
        let response = self.http.post(url).json(request).send().await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn get_event(&self, event_id: &EventId) -> ClientResult<EventSummary> {
        let url = self.endpoint(&["events", event_id.as_str()])?;
        let response = self.http.get(url).send().await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn recommended_events(&self, event_id: &EventId) -> ClientResult<Vec<EventSummary>> {
        let url = self.endpoint(&["events", "recommended", event_id.as_str()])?;
        let response = self.http.get(url).send().await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn create_event(&self, payload: &EventPayload) -> ClientResult<()> {
        let url = self.endpoint(&["events"])?;
        let response = self.http.post(url).json(payload).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn update_event(&self, event_id: &EventId, payload: &EventPayload) -> ClientResult<()> {
        let url = self.endpoint(&["events", event_id.as_str()])?;
        let response = self.http.patch(url).json(payload).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn delete_event(&self, event_id: &EventId) -> ClientResult<()> {
        let url = self.endpoint(&["events", event_id.as_str()])?;
        let response = self.http.delete(url).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn list_cities(&self) -> ClientResult<Vec<CityRef>> {
        let url = self.endpoint(&["cities", "list"])?;
        let response = self.http.get(url).send().await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn list_categories(&self) -> ClientResult<Vec<CategoryRef>> {
        let url = self.endpoint(&["categories", "list"])?;
        let response = self.http.get(url).send().await?;
        Ok(ensure_success(response).await?.json().await?)
    }
}

#[cfg(test)]
#[path = "tests/backend_tests.rs"]
mod tests;
