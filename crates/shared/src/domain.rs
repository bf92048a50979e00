use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(EventId);
id_newtype!(CityId);
id_newtype!(CategoryId);

/// Listing sort order understood by the server. Absence means server order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    Title,
    Description,
    EventDate,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::EventDate => "eventDate",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "title" => Some(Self::Title),
            "description" => Some(Self::Description),
            "eventDate" | "event_date" | "date" => Some(Self::EventDate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityRef {
    pub id: CityId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub id: EventId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: String,
    pub event_date: DateTime<Utc>,
    #[serde(default)]
    pub city: Option<CityRef>,
    #[serde(default)]
    pub categories: Vec<CategoryRef>,
}

impl EventSummary {
    pub fn city_name(&self) -> &str {
        self.city
            .as_ref()
            .map(|city| city.name.as_str())
            .unwrap_or("Hidden")
    }

    pub fn category_names(&self) -> Vec<&str> {
        self.categories
            .iter()
            .map(|category| category.name.as_str())
            .collect()
    }
}
