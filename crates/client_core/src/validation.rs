//! Client-side checks that gate event submission.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use shared::{
    domain::{CategoryRef, CityRef},
    error::ValidationFailure,
    protocol::EventPayload,
};

const MIN_TITLE_LEN: usize = 3;
const MIN_ADDRESS_LEN: usize = 3;
const MIN_CATEGORIES: usize = 2;

/// Form state of an event being created or edited.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventDraft {
    pub title: String,
    pub address: String,
    pub selected_city: Option<CityRef>,
    pub selected_categories: Vec<CategoryRef>,
    pub event_date: Option<DateTime<Utc>>,
    pub description: String,
}

impl EventDraft {
    pub fn to_payload(&self) -> EventPayload {
        EventPayload {
            title: self.title.clone(),
            address: self.address.clone(),
            city_id: self.selected_city.as_ref().map(|city| city.id.clone()),
            category_ids: self
                .selected_categories
                .iter()
                .map(|category| category.id.clone())
                .collect(),
            event_date: self.event_date,
            description: self.description.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DraftField {
    Title,
    Address,
    SelectedCity,
    SelectedCategories,
    EventDate,
}

impl DraftField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Address => "address",
            Self::SelectedCity => "selectedCity",
            Self::SelectedCategories => "selectedCategories",
            Self::EventDate => "eventDate",
        }
    }
}

/// Every failing field of a draft. Empty means the draft may be submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    failures: BTreeMap<DraftField, ValidationFailure>,
}

impl ValidationReport {
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn get(&self, field: DraftField) -> Option<ValidationFailure> {
        self.failures.get(&field).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DraftField, ValidationFailure)> + '_ {
        self.failures
            .iter()
            .map(|(field, failure)| (*field, *failure))
    }

    fn insert(&mut self, field: DraftField, failure: ValidationFailure) {
        self.failures.insert(field, failure);
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (field, failure)) in self.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {failure}", field.as_str())?;
        }
        Ok(())
    }
}

/// Runs every rule against `draft`; nothing short-circuits.
pub fn validate_draft(draft: &EventDraft, now: DateTime<Utc>) -> ValidationReport {
    let mut report = ValidationReport::default();

    if draft.title.chars().count() < MIN_TITLE_LEN {
        report.insert(DraftField::Title, ValidationFailure::TitleTooShort);
    }
    if draft.address.chars().count() < MIN_ADDRESS_LEN {
        report.insert(DraftField::Address, ValidationFailure::AddressTooShort);
    }
    if draft.selected_city.is_none() {
        report.insert(DraftField::SelectedCity, ValidationFailure::CityRequired);
    }
    if draft.selected_categories.len() < MIN_CATEGORIES {
        report.insert(
            DraftField::SelectedCategories,
            ValidationFailure::CategoryMinLength,
        );
    }
    match draft.event_date {
        None => report.insert(DraftField::EventDate, ValidationFailure::EventDateRequired),
        Some(date) if date < now => {
            report.insert(DraftField::EventDate, ValidationFailure::EventDateMustBeFuture)
        }
        Some(_) => {}
    }

    report
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
