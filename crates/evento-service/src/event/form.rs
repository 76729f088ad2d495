use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDateTime, Utc};
use evento_db::db::enums::EventCategory;
use evento_db::db::store::EventFields;
use serde::Deserialize;

use crate::validation::ValidationErrors;

pub const TITLE_MAX_LEN: usize = 200;
pub const LOCATION_MAX_LEN: usize = 300;

const REQUIRED: &str = "This field is required.";

/// Accepted `scheduled_at` layouts besides RFC 3339. Read as UTC.
const LOCAL_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// An event as submitted by a client, before validation.
///
/// There is no organizer field: the organizer is always the acting
/// principal, and any submitted value is dropped during deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EventForm {
    pub title: String,
    pub description: String,
    pub category: String,
    pub scheduled_at: String,
    pub location: String,
    pub is_private: bool,
    pub attendees: Vec<String>,
}

/// ## Summary
/// Parses an RFC 3339 timestamp or a zone-less `datetime-local` value.
#[must_use]
pub fn parse_scheduled_at(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

fn required_text(
    errors: &mut ValidationErrors,
    field: &str,
    value: &str,
    max_len: Option<usize>,
) -> String {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
    } else if let Some(max) = max_len {
        let len = value.chars().count();
        if len > max {
            errors.add(
                field,
                format!("Ensure this value has at most {max} characters (it has {len})."),
            );
        }
    }
    value.to_string()
}

impl EventForm {
    /// ## Summary
    /// Checks every field and returns the values to store.
    ///
    /// Attendee ids are parsed here; whether they name existing users is
    /// checked against the store by the caller.
    ///
    /// ## Errors
    /// Returns every field error found.
    pub fn validate(&self) -> Result<EventFields, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let title = required_text(&mut errors, "title", &self.title, Some(TITLE_MAX_LEN));
        let description = required_text(&mut errors, "description", &self.description, None);
        let location = required_text(
            &mut errors,
            "location",
            &self.location,
            Some(LOCATION_MAX_LEN),
        );

        let category = if self.category.trim().is_empty() {
            errors.add("category", REQUIRED);
            None
        } else {
            self.category.parse::<EventCategory>().ok().or_else(|| {
                errors.add(
                    "category",
                    format!(
                        "Select a valid choice. {} is not one of the available choices.",
                        self.category.trim()
                    ),
                );
                None
            })
        };

        let scheduled_at = if self.scheduled_at.trim().is_empty() {
            errors.add("scheduled_at", REQUIRED);
            None
        } else {
            parse_scheduled_at(&self.scheduled_at).or_else(|| {
                errors.add("scheduled_at", "Enter a valid date/time.");
                None
            })
        };

        let mut attendees = BTreeSet::new();
        for raw in &self.attendees {
            match uuid::Uuid::parse_str(raw.trim()) {
                Ok(id) => {
                    attendees.insert(id);
                }
                Err(_) => errors.add("attendees", format!("\"{raw}\" is not a valid UUID.")),
            }
        }

        match (category, scheduled_at) {
            (Some(category), Some(scheduled_at)) if errors.is_empty() => Ok(EventFields {
                title,
                description,
                category,
                scheduled_at,
                location,
                is_private: self.is_private,
                attendees,
            }),
            _ => Err(errors),
        }
    }
}
