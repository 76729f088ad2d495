//! Policy-gated event operations.
//!
//! Every function loads what the policy needs, asks the policy, and only
//! touches the store once the answer is "allow". A missing event is reported
//! as `EventNotFound`, distinct from `Denied`.

use evento_core::policy::{
    self, Operation, Principal, QueryScope, check, is_admin, is_organizer, list_scope,
};
use evento_db::db::store::{EventFields, EventQuery, EventStore};
use evento_db::error::DbError;
use evento_db::model::event::EventWithAttendees;
use serde::Serialize;

use super::form::EventForm;
use crate::error::{ServiceError, ServiceResult};
use crate::validation::ValidationErrors;

/// One page of an event listing.
#[derive(Debug, Clone, Serialize)]
pub struct EventListing {
    pub events: Vec<EventWithAttendees>,
    pub page: u32,
    pub page_size: u16,
    pub total: i64,
    pub num_pages: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

impl EventListing {
    /// ## Summary
    /// Wraps a fetched page, computing the page count.
    #[must_use]
    pub fn new(events: Vec<EventWithAttendees>, page: u32, page_size: u16, total: i64) -> Self {
        let num_pages = page_count(total, page_size);
        Self {
            events,
            page,
            page_size,
            total,
            num_pages,
            has_next: page < num_pages,
            has_previous: page > 1,
        }
    }
}

/// Number of pages for `total` items; an empty listing still has one page.
#[must_use]
pub fn page_count(total: i64, page_size: u16) -> u32 {
    let size = i64::from(page_size.max(1));
    let pages = (total.max(0) + size - 1) / size;
    u32::try_from(pages.max(1)).unwrap_or(u32::MAX)
}

/// What the dashboard shows the signed-in user.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub user: Principal,
    pub is_admin: bool,
    pub is_organizer: bool,
    pub organized: Vec<EventWithAttendees>,
    pub attending: Vec<EventWithAttendees>,
}

pub(crate) fn require(
    principal: &Principal,
    operation: &Operation<'_, EventWithAttendees>,
) -> ServiceResult<()> {
    let action = operation.action();
    if check(principal, operation).is_allowed() {
        Ok(())
    } else {
        tracing::debug!(principal = %principal.id, %action, "Operation denied");
        Err(ServiceError::Denied(action))
    }
}

pub(crate) async fn load(
    store: &dyn EventStore,
    id: uuid::Uuid,
) -> ServiceResult<EventWithAttendees> {
    store
        .find_by_id(id)
        .await?
        .ok_or(ServiceError::EventNotFound(id))
}

fn attendee_errors(missing: &[uuid::Uuid]) -> ServiceError {
    let mut errors = ValidationErrors::new();
    for id in missing {
        errors.add(
            "attendees",
            format!("Select a valid choice. {id} is not one of the available choices."),
        );
    }
    errors.into()
}

/// ## Summary
/// Validates the form and checks that every attendee exists.
///
/// ## Errors
/// Returns `Validation` for bad fields or unknown attendees.
pub(crate) async fn validated_fields(
    store: &dyn EventStore,
    form: &EventForm,
) -> ServiceResult<EventFields> {
    let fields = form.validate()?;
    let missing = store.missing_users(&fields.attendees).await?;
    if missing.is_empty() {
        Ok(fields)
    } else {
        Err(attendee_errors(&missing))
    }
}

/// Maps an attendee deleted between validation and write to a validation error.
pub(crate) fn write_error(error: DbError) -> ServiceError {
    match error {
        DbError::MissingUsers(missing) => attendee_errors(&missing),
        other => other.into(),
    }
}

/// ## Summary
/// Lists one page of the events the principal may see, newest first.
///
/// ## Errors
/// Returns `NotFound` for a page past the last one.
#[tracing::instrument(skip(store, principal), fields(principal = %principal.id))]
pub async fn list_events(
    store: &dyn EventStore,
    principal: &Principal,
    page: u32,
    page_size: u16,
) -> ServiceResult<EventListing> {
    let page = page.max(1);
    let scope = list_scope(principal);
    let query = EventQuery::scoped(scope, principal.id).page(page, page_size);
    let result = store.list_where(&query).await?;

    if page > page_count(result.total, page_size) {
        return Err(ServiceError::NotFound(format!("page {page}")));
    }

    let fetched = result.events.len();
    let events = result
        .events
        .into_iter()
        .filter(|event| scope == QueryScope::All || policy::can_view(principal, event))
        .collect::<Vec<_>>();
    if events.len() != fetched {
        tracing::warn!(
            fetched,
            visible = events.len(),
            "Store returned events outside the list scope"
        );
    }

    Ok(EventListing::new(events, page, page_size, result.total))
}

/// ## Summary
/// Returns an event the principal may view.
///
/// ## Errors
/// Returns `EventNotFound` or `Denied(View)`.
#[tracing::instrument(skip(store, principal), fields(principal = %principal.id))]
pub async fn get_event(
    store: &dyn EventStore,
    principal: &Principal,
    id: uuid::Uuid,
) -> ServiceResult<EventWithAttendees> {
    let event = load(store, id).await?;
    require(principal, &Operation::View(&event))?;
    Ok(event)
}

/// ## Summary
/// Returns an event the principal may edit, for pre-filling the edit form.
///
/// ## Errors
/// Returns `EventNotFound` or `Denied(Edit)`.
pub async fn event_for_edit(
    store: &dyn EventStore,
    principal: &Principal,
    id: uuid::Uuid,
) -> ServiceResult<EventWithAttendees> {
    let event = load(store, id).await?;
    require(principal, &Operation::Edit(&event))?;
    Ok(event)
}

/// ## Summary
/// Returns an event the principal may delete, for the confirmation step.
///
/// ## Errors
/// Returns `EventNotFound` or `Denied(Delete)`.
pub async fn event_for_delete(
    store: &dyn EventStore,
    principal: &Principal,
    id: uuid::Uuid,
) -> ServiceResult<EventWithAttendees> {
    let event = load(store, id).await?;
    require(principal, &Operation::Delete(&event))?;
    Ok(event)
}

/// ## Summary
/// Creates an event organized by the principal.
///
/// The permission is checked before the form is looked at.
///
/// ## Side Effects
/// Inserts the event and its attendee rows.
///
/// ## Errors
/// Returns `Denied(Create)` or `Validation`.
#[tracing::instrument(skip(store, principal, form), fields(principal = %principal.id))]
pub async fn create_event(
    store: &dyn EventStore,
    principal: &Principal,
    form: &EventForm,
) -> ServiceResult<EventWithAttendees> {
    require(principal, &Operation::Create)?;
    let fields = validated_fields(store, form).await?;

    let event = store
        .create(&fields, principal.id)
        .await
        .map_err(write_error)?;
    tracing::info!(event_id = %event.id(), "Event created");
    Ok(event)
}

/// ## Summary
/// Updates an event the principal may edit. The organizer never changes.
///
/// ## Side Effects
/// Rewrites the event row and replaces its attendee rows.
///
/// ## Errors
/// Returns `EventNotFound`, `Denied(Edit)` or `Validation`.
#[tracing::instrument(skip(store, principal, form), fields(principal = %principal.id))]
pub async fn update_event(
    store: &dyn EventStore,
    principal: &Principal,
    id: uuid::Uuid,
    form: &EventForm,
) -> ServiceResult<EventWithAttendees> {
    let event = event_for_edit(store, principal, id).await?;
    let fields = validated_fields(store, form).await?;

    let updated = store.update(&event, &fields).await.map_err(write_error)?;
    tracing::info!(event_id = %updated.id(), "Event updated");
    Ok(updated)
}

/// ## Summary
/// Deletes an event. Only administrators may.
///
/// ## Side Effects
/// Removes the event and its attendee rows.
///
/// ## Errors
/// Returns `EventNotFound` or `Denied(Delete)`.
#[tracing::instrument(skip(store, principal), fields(principal = %principal.id))]
pub async fn delete_event(
    store: &dyn EventStore,
    principal: &Principal,
    id: uuid::Uuid,
) -> ServiceResult<()> {
    let event = event_for_delete(store, principal, id).await?;
    store.delete(&event).await?;
    tracing::info!(event_id = %id, "Event deleted");
    Ok(())
}

/// ## Summary
/// Collects the events the principal organizes and attends.
///
/// ## Errors
/// Returns an error if the store fails.
#[tracing::instrument(skip(store, principal), fields(principal = %principal.id))]
pub async fn dashboard(store: &dyn EventStore, principal: &Principal) -> ServiceResult<Dashboard> {
    let organized = store
        .list_where(&EventQuery::scoped(QueryScope::All, principal.id).organized_by(principal.id))
        .await?
        .events;
    let attending = store
        .list_where(&EventQuery::scoped(QueryScope::All, principal.id).attended_by(principal.id))
        .await?
        .events;

    Ok(Dashboard {
        user: principal.clone(),
        is_admin: is_admin(principal),
        is_organizer: is_organizer(principal),
        organized,
        attending,
    })
}
