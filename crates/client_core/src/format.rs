use chrono::{DateTime, Utc};

pub const CARD_TITLE_LIMIT: usize = 50;
pub const TILE_TEXT_LIMIT: usize = 15;

/// `18 October 2026 03:30 pm`
pub fn format_event_date(date: &DateTime<Utc>) -> String {
    date.format("%d %B %Y %I:%M %P").to_string()
}

/// Title as shown on a listing card.
pub fn card_title(title: &str) -> String {
    match truncate_chars(title, CARD_TITLE_LIMIT) {
        Some(head) => format!("{head}..."),
        None => title.to_string(),
    }
}

/// Short text for recommendation tiles.
pub fn tile_text(text: &str) -> String {
    match truncate_chars(text, TILE_TEXT_LIMIT) {
        Some(head) => format!("{head} .."),
        None => text.to_string(),
    }
}

fn truncate_chars(text: &str, limit: usize) -> Option<&str> {
    text.char_indices().nth(limit).map(|(index, _)| &text[..index])
}
