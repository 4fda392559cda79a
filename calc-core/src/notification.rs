//! Plain-text notification sent to the sales inbox for every lead.

use chrono::{DateTime, Utc};

use crate::calculator::pricing::format_price;
use crate::models::LeadRecord;

/// Renders the body of the notification for `lead`.
pub fn render_lead_message(lead: &LeadRecord) -> String {
    let contact = &lead.contact_data;

    let addons = if lead.selected_addons.is_empty() {
        "Brak wybranych dodatków".to_string()
    } else {
        lead.selected_addons
            .iter()
            .map(|selected| {
                format!(
                    "• {} - {}",
                    selected.addon.label,
                    format_price(selected.addon.price)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let notes = if lead.notes.trim().is_empty() {
        "Brak dodatkowych uwag"
    } else {
        lead.notes.as_str()
    };

    format!(
        "NOWE ZAPYTANIE Z KALKULATORA PROJEKTOWEGO\n\
         \n\
         DANE KONTAKTOWE:\n\
         Imię: {first_name}\n\
         Email: {email}\n\
         Telefon: {phone}\n\
         \n\
         SZCZEGÓŁY PROJEKTU:\n\
         Typ projektu: {project}\n\
         Całkowity koszt: {total}\n\
         \n\
         WYBRANE DODATKI:\n\
         {addons}\n\
         \n\
         DODATKOWE UWAGI:\n\
         {notes}\n\
         \n\
         DATA ZGŁOSZENIA:\n\
         {submitted}",
        first_name = contact.first_name,
        email = contact.email,
        phone = contact.phone,
        project = lead.project_type.display_name(),
        total = format_price(lead.total_cost),
        submitted = format_submitted_at(&lead.timestamp),
    )
}

fn format_submitted_at(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%d.%m.%Y, %H:%M:%S UTC").to_string()
}
