use client_core::{
    format::{card_title, format_event_date, tile_text},
    EventDetails, ReferenceData, ResultPage, ValidationReport,
};
use shared::domain::EventSummary;

pub fn print_page(page: &ResultPage) {
    println!("--- page {} ---", page.page_number);
    if page.is_empty() {
        println!("No events found");
        return;
    }
    for event in &page.items {
        print_card(event);
    }
}

pub fn print_card(event: &EventSummary) {
    println!("[{}] {}", event.id, card_title(&event.title));
    if !event.description.is_empty() {
        println!("    {}", event.description);
    }
    println!(
        "    City: {} | Categories: {} | Date: {}",
        event.city_name(),
        event.category_names().join(", "),
        format_event_date(&event.event_date)
    );
}

pub fn print_details(details: &EventDetails) {
    let event = &details.event;
    println!("Title: {}", event.title);
    println!("Description: {}", event.description);
    println!("City: {}", event.city_name());
    println!("Categories: {}", event.category_names().join(", "));
    println!("Address: {}", event.address);
    println!("Event Date: {}", format_event_date(&event.event_date));

    println!();
    println!("Recommended Events");
    for recommended in &details.recommended {
        println!(
            "  [{}] {} / {} / {}",
            recommended.id,
            tile_text(&recommended.title),
            tile_text(&recommended.address),
            format_event_date(&recommended.event_date)
        );
    }
}

pub fn print_reference(reference: &ReferenceData, cities: bool) {
    if cities {
        for city in &reference.cities {
            println!("{}\t{}", city.id, city.name);
        }
    } else {
        for category in &reference.categories {
            println!("{}\t{}", category.id, category.name);
        }
    }
}

pub fn print_validation(report: &ValidationReport) {
    eprintln!("The event was not submitted:");
    for (field, failure) in report.iter() {
        eprintln!("  {}: {failure}", field.as_str());
    }
}
