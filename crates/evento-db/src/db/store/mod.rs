//! Store traits consumed by the service layer.
//!
//! Services hold `Arc<dyn EventStore>` and `Arc<dyn AccountStore>`; the
//! PostgreSQL implementation lives in [`pg`]. Methods return boxed futures so
//! the traits stay object safe.

mod pg;

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use evento_core::policy::QueryScope;
use futures::future::BoxFuture;

use crate::db::enums::EventCategory;
use crate::error::DbResult;
use crate::model::event::{EventChangeset, EventWithAttendees, NewEvent};
use crate::model::session::{NewSession, Session};
use crate::model::user::{NewAccount, User};

pub use pg::PgStore;

/// Calendar drill-down of the admin listing: a year, optionally narrowed to a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateDrill {
    pub year: i32,
    pub month: Option<u32>,
}

impl DateDrill {
    /// ## Summary
    /// Returns the half-open `[start, end)` range covered by the drill-down.
    ///
    /// Returns `None` for a month outside `1..=12` or a year chrono cannot represent.
    #[must_use]
    pub fn bounds(self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let (start, end) = match self.month {
            None => (
                NaiveDate::from_ymd_opt(self.year, 1, 1)?,
                NaiveDate::from_ymd_opt(self.year + 1, 1, 1)?,
            ),
            Some(month) => {
                let start = NaiveDate::from_ymd_opt(self.year, month, 1)?;
                let end = if month == 12 {
                    NaiveDate::from_ymd_opt(self.year + 1, 1, 1)?
                } else {
                    NaiveDate::from_ymd_opt(start.year(), month + 1, 1)?
                };
                (start, end)
            }
        };
        Some((
            start.and_hms_opt(0, 0, 0)?.and_utc(),
            end.and_hms_opt(0, 0, 0)?.and_utc(),
        ))
    }
}

/// Filters and paging for an event listing.
///
/// Results are always ordered by `scheduled_at` descending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub scope: QueryScope,
    /// Principal the scope is evaluated for.
    pub principal_id: uuid::Uuid,
    pub category: Option<EventCategory>,
    pub is_private: Option<bool>,
    /// Case-insensitive substring over title, description and location.
    pub search: Option<String>,
    pub date: Option<DateDrill>,
    pub organizer_id: Option<uuid::Uuid>,
    pub attendee_id: Option<uuid::Uuid>,
    pub offset: i64,
    pub limit: Option<i64>,
}

impl EventQuery {
    #[must_use]
    pub const fn scoped(scope: QueryScope, principal_id: uuid::Uuid) -> Self {
        Self {
            scope,
            principal_id,
            category: None,
            is_private: None,
            search: None,
            date: None,
            organizer_id: None,
            attendee_id: None,
            offset: 0,
            limit: None,
        }
    }

    #[must_use]
    pub const fn organized_by(mut self, user_id: uuid::Uuid) -> Self {
        self.organizer_id = Some(user_id);
        self
    }

    #[must_use]
    pub const fn attended_by(mut self, user_id: uuid::Uuid) -> Self {
        self.attendee_id = Some(user_id);
        self
    }

    /// ## Summary
    /// Restricts the listing to one page. Pages are numbered from 1.
    #[must_use]
    pub fn page(mut self, page: u32, page_size: u16) -> Self {
        let size = i64::from(page_size.max(1));
        self.offset = i64::from(page.max(1) - 1) * size;
        self.limit = Some(size);
        self
    }

    /// ## Summary
    /// Evaluates every filter except paging against a loaded event.
    ///
    /// Mirrors the SQL built by `query::event::filtered` for stores that
    /// filter in memory.
    #[must_use]
    pub fn matches(&self, event: &EventWithAttendees) -> bool {
        let row = &event.event;

        if !self.scope.admits(self.principal_id, event) {
            return false;
        }
        if self.category.is_some_and(|category| category != row.category) {
            return false;
        }
        if self.is_private.is_some_and(|private| private != row.is_private) {
            return false;
        }
        if self.organizer_id.is_some_and(|id| id != row.organizer_id) {
            return false;
        }
        if self
            .attendee_id
            .is_some_and(|id| !event.attendees.contains(&id))
        {
            return false;
        }
        if let Some(drill) = self.date {
            let Some((start, end)) = drill.bounds() else {
                return false;
            };
            if row.scheduled_at < start || row.scheduled_at >= end {
                return false;
            }
        }
        if let Some(needle) = self.search.as_deref().map(str::to_lowercase) {
            return [&row.title, &row.description, &row.location]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
        }
        true
    }
}

/// The editable fields of an event, as submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFields {
    pub title: String,
    pub description: String,
    pub category: EventCategory,
    pub scheduled_at: DateTime<Utc>,
    pub location: String,
    pub is_private: bool,
    pub attendees: BTreeSet<uuid::Uuid>,
}

impl EventFields {
    #[must_use]
    pub fn as_new_event(&self, id: uuid::Uuid, organizer_id: uuid::Uuid) -> NewEvent<'_> {
        NewEvent {
            id,
            title: &self.title,
            description: &self.description,
            category: self.category,
            scheduled_at: self.scheduled_at,
            location: &self.location,
            is_private: self.is_private,
            organizer_id,
        }
    }

    #[must_use]
    pub fn as_changeset(&self, now: DateTime<Utc>) -> EventChangeset<'_> {
        EventChangeset {
            title: &self.title,
            description: &self.description,
            category: self.category,
            scheduled_at: self.scheduled_at,
            location: &self.location,
            is_private: self.is_private,
            updated_at: now,
        }
    }
}

/// One page of a listing plus the number of matching events across all pages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPage {
    pub events: Vec<EventWithAttendees>,
    pub total: i64,
}

/// Durable storage of events and their attendees.
pub trait EventStore: Send + Sync {
    fn find_by_id(&self, id: uuid::Uuid) -> BoxFuture<'_, DbResult<Option<EventWithAttendees>>>;

    fn list_all(&self) -> BoxFuture<'_, DbResult<Vec<EventWithAttendees>>>;

    fn list_where<'a>(&'a self, query: &'a EventQuery) -> BoxFuture<'a, DbResult<EventPage>>;

    /// ## Summary
    /// Inserts the event and its attendee rows in one transaction.
    ///
    /// ## Errors
    /// Returns `DbError::MissingUsers` if an attendee does not exist.
    fn create<'a>(
        &'a self,
        fields: &'a EventFields,
        organizer_id: uuid::Uuid,
    ) -> BoxFuture<'a, DbResult<EventWithAttendees>>;

    /// ## Summary
    /// Overwrites the editable fields and replaces the attendee set in one
    /// transaction. The organizer is kept.
    fn update<'a>(
        &'a self,
        event: &'a EventWithAttendees,
        fields: &'a EventFields,
    ) -> BoxFuture<'a, DbResult<EventWithAttendees>>;

    fn delete<'a>(&'a self, event: &'a EventWithAttendees) -> BoxFuture<'a, DbResult<()>>;

    /// Returns the ids in `ids` that do not name an existing user.
    fn missing_users<'a>(
        &'a self,
        ids: &'a BTreeSet<uuid::Uuid>,
    ) -> BoxFuture<'a, DbResult<Vec<uuid::Uuid>>>;
}

/// Users, credentials, group memberships and login sessions.
pub trait AccountStore: Send + Sync {
    fn find_user_by_id(&self, id: uuid::Uuid) -> BoxFuture<'_, DbResult<Option<User>>>;

    fn find_user_by_username<'a>(
        &'a self,
        username: &'a str,
    ) -> BoxFuture<'a, DbResult<Option<User>>>;

    /// PHC string of the user's password credential, if any.
    fn password_hash(&self, user_id: uuid::Uuid) -> BoxFuture<'_, DbResult<Option<String>>>;

    /// ## Summary
    /// Creates a user and its password credential.
    ///
    /// ## Errors
    /// Returns `DbError::Conflict` if the username is taken.
    fn create_user<'a>(
        &'a self,
        account: &'a NewAccount,
        password_hash: &'a str,
    ) -> BoxFuture<'a, DbResult<User>>;

    /// Returns the updated user, or `None` if it does not exist.
    fn set_staff(
        &self,
        user_id: uuid::Uuid,
        is_staff: bool,
    ) -> BoxFuture<'_, DbResult<Option<User>>>;

    fn groups_for_user(&self, user_id: uuid::Uuid) -> BoxFuture<'_, DbResult<Vec<String>>>;

    /// Adds the user to the named group, creating the group if needed.
    fn add_to_group<'a>(&'a self, user_id: uuid::Uuid, group: &'a str)
    -> BoxFuture<'a, DbResult<()>>;

    /// Returns `true` if a membership was removed.
    fn remove_from_group<'a>(
        &'a self,
        user_id: uuid::Uuid,
        group: &'a str,
    ) -> BoxFuture<'a, DbResult<bool>>;

    fn create_session<'a>(&'a self, session: &'a NewSession) -> BoxFuture<'a, DbResult<()>>;

    fn find_session<'a>(&'a self, token_hash: &'a str) -> BoxFuture<'a, DbResult<Option<Session>>>;

    fn delete_session<'a>(&'a self, token_hash: &'a str) -> BoxFuture<'a, DbResult<()>>;

    /// Removes every session that expired at or before `now`, returning how
    /// many were removed.
    fn delete_expired_sessions(&self, now: DateTime<Utc>) -> BoxFuture<'_, DbResult<usize>>;
}
