//! Query builder functions for events.

use diesel::dsl::sql;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::Bool;
use evento_core::policy::QueryScope;

use crate::db::schema::{event, event_attendee};
use crate::db::store::EventQuery;

/// ## Summary
/// Returns a query to select all events.
#[must_use]
pub fn all() -> event::BoxedQuery<'static, Pg> {
    event::table.into_boxed()
}

/// ## Summary
/// Returns a query to find an event by ID.
#[must_use]
pub fn by_id(id: uuid::Uuid) -> event::BoxedQuery<'static, Pg> {
    all().filter(event::id.eq(id))
}

/// ## Summary
/// Returns a query to find the attendee rows of the given events.
#[must_use]
pub fn attendees_of(event_ids: Vec<uuid::Uuid>) -> event_attendee::BoxedQuery<'static, Pg> {
    event_attendee::table
        .filter(event_attendee::event_id.eq_any(event_ids))
        .into_boxed()
}

/// Escapes `LIKE` metacharacters and wraps the needle for substring matching.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// ## Summary
/// Returns a query selecting every event matched by `query`, without paging
/// or ordering. Suitable for counting.
#[must_use]
pub fn filtered(query: &EventQuery) -> event::BoxedQuery<'static, Pg> {
    let principal_id = query.principal_id;
    let mut q = all();

    q = match query.scope {
        QueryScope::All => q,
        QueryScope::MineAndPublic => q.filter(
            event::is_private
                .eq(false)
                .or(event::organizer_id.eq(principal_id))
                .or(event::id.eq_any(
                    event_attendee::table
                        .filter(event_attendee::user_id.eq(principal_id))
                        .select(event_attendee::event_id),
                )),
        ),
        QueryScope::Organized => q.filter(event::organizer_id.eq(principal_id)),
        QueryScope::Nothing => q.filter(sql::<Bool>("FALSE")),
    };

    if let Some(category) = query.category {
        q = q.filter(event::category.eq(category));
    }
    if let Some(private) = query.is_private {
        q = q.filter(event::is_private.eq(private));
    }
    if let Some(organizer_id) = query.organizer_id {
        q = q.filter(event::organizer_id.eq(organizer_id));
    }
    if let Some(attendee_id) = query.attendee_id {
        q = q.filter(
            event::id.eq_any(
                event_attendee::table
                    .filter(event_attendee::user_id.eq(attendee_id))
                    .select(event_attendee::event_id),
            ),
        );
    }
    if let Some(drill) = query.date {
        q = match drill.bounds() {
            Some((start, end)) => q.filter(
                event::scheduled_at
                    .ge(start)
                    .and(event::scheduled_at.lt(end)),
            ),
            None => q.filter(sql::<Bool>("FALSE")),
        };
    }
    if let Some(needle) = query.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = contains_pattern(needle);
        q = q.filter(
            event::title
                .ilike(pattern.clone())
                .or(event::description.ilike(pattern.clone()))
                .or(event::location.ilike(pattern)),
        );
    }

    q
}

/// ## Summary
/// Returns the filtered query ordered by `scheduled_at` descending, with
/// paging applied.
#[must_use]
pub fn listing(query: &EventQuery) -> event::BoxedQuery<'static, Pg> {
    let mut q = filtered(query)
        .order((event::scheduled_at.desc(), event::id.desc()))
        .offset(query.offset);
    if let Some(limit) = query.limit {
        q = q.limit(limit);
    }
    q
}
