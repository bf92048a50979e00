use shared::domain::{CategoryId, CategoryRef, CityId, CityRef};
use tracing::warn;

use crate::{backend::EventsBackend, error::ClientResult};

/// City and category choices, loaded once and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceData {
    pub cities: Vec<CityRef>,
    pub categories: Vec<CategoryRef>,
}

impl ReferenceData {
    /// Fetches both lists concurrently; either failure fails the load.
    pub async fn fetch(backend: &dyn EventsBackend) -> ClientResult<Self> {
        let (cities, categories) =
            futures::future::try_join(backend.list_cities(), backend.list_categories()).await?;
        Ok(Self { cities, categories })
    }

    /// Like [`ReferenceData::fetch`], but each list degrades to empty on
    /// failure so the rest of the screen keeps working.
    pub async fn fetch_lenient(backend: &dyn EventsBackend) -> Self {
        let (cities, categories) =
            futures::future::join(backend.list_cities(), backend.list_categories()).await;
        let cities = cities.unwrap_or_else(|error| {
            warn!(%error, "failed to load cities");
            Vec::new()
        });
        let categories = categories.unwrap_or_else(|error| {
            warn!(%error, "failed to load categories");
            Vec::new()
        });
        Self { cities, categories }
    }

    pub fn city(&self, id: &CityId) -> Option<&CityRef> {
        self.cities.iter().find(|city| &city.id == id)
    }

    pub fn category(&self, id: &CategoryId) -> Option<&CategoryRef> {
        self.categories.iter().find(|category| &category.id == id)
    }

    /// Case-insensitive lookup by id or display name.
    pub fn find_city(&self, key: &str) -> Option<&CityRef> {
        self.cities
            .iter()
            .find(|city| city.id.as_str() == key || city.name.eq_ignore_ascii_case(key))
    }

    /// Case-insensitive lookup by id or display name.
    pub fn find_category(&self, key: &str) -> Option<&CategoryRef> {
        self.categories.iter().find(|category| {
            category.id.as_str() == key || category.name.eq_ignore_ascii_case(key)
        })
    }
}
