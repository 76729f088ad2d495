use std::collections::BTreeSet;

use diesel::{pg::Pg, prelude::*};
use evento_core::policy::AccessTarget;
use serde::Serialize;

use crate::db::{enums::EventCategory, schema};

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = schema::event)]
#[diesel(check_for_backend(Pg))]
pub struct Event {
    pub id: uuid::Uuid,
    pub title: String,
    pub description: String,
    pub category: EventCategory,
    pub scheduled_at: chrono::DateTime<chrono::Utc>,
    pub location: String,
    pub is_private: bool,
    pub organizer_id: uuid::Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::event)]
pub struct NewEvent<'a> {
    pub id: uuid::Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub category: EventCategory,
    pub scheduled_at: chrono::DateTime<chrono::Utc>,
    pub location: &'a str,
    pub is_private: bool,
    pub organizer_id: uuid::Uuid,
}

/// Editable columns. The organizer is not among them.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = schema::event)]
pub struct EventChangeset<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub category: EventCategory,
    pub scheduled_at: chrono::DateTime<chrono::Utc>,
    pub location: &'a str,
    pub is_private: bool,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Insertable, Queryable, Selectable)]
#[diesel(table_name = schema::event_attendee)]
#[diesel(check_for_backend(Pg))]
pub struct EventAttendee {
    pub event_id: uuid::Uuid,
    pub user_id: uuid::Uuid,
}

/// An event together with its attendee set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventWithAttendees {
    #[serde(flatten)]
    pub event: Event,
    pub attendees: BTreeSet<uuid::Uuid>,
}

impl EventWithAttendees {
    #[must_use]
    pub const fn new(event: Event, attendees: BTreeSet<uuid::Uuid>) -> Self {
        Self { event, attendees }
    }

    #[must_use]
    pub const fn id(&self) -> uuid::Uuid {
        self.event.id
    }
}

impl AccessTarget for EventWithAttendees {
    fn is_private(&self) -> bool {
        self.event.is_private
    }

    fn organizer_id(&self) -> uuid::Uuid {
        self.event.organizer_id
    }

    fn has_attendee(&self, principal_id: uuid::Uuid) -> bool {
        self.attendees.contains(&principal_id)
    }
}
