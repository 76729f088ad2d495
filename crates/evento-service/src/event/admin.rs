//! The admin panel over events.
//!
//! Staff see the events their grants cover: everything for administrators,
//! their own events for organizers, nothing otherwise. An event outside that
//! scope is reported as missing.

use evento_core::policy::{Operation, Principal, admin_scope};
use evento_db::db::enums::EventCategory;
use evento_db::db::store::{DateDrill, EventQuery, EventStore};
use evento_db::model::event::EventWithAttendees;
use serde::Deserialize;

use super::form::EventForm;
use super::service::{EventListing, load, page_count, require, validated_fields, write_error};
use crate::error::{ServiceError, ServiceResult};
use crate::validation::ValidationErrors;

pub const ADMIN_PAGE_SIZE: u16 = 100;

/// Query string filters of the admin listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AdminFilter {
    pub category: Option<String>,
    pub is_private: Option<bool>,
    /// Search over title, description and location.
    pub q: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    /// Read from the query string by the caller, which answers 404 for
    /// anything that is not a positive number.
    #[serde(skip)]
    pub page: Option<u32>,
}

impl AdminFilter {
    /// ## Summary
    /// Builds the store query for the given scope.
    ///
    /// ## Errors
    /// Returns `Validation` for an unknown category, a month without a year
    /// or a month outside `1..=12`.
    pub fn to_query(
        &self,
        principal: &Principal,
        page_size: u16,
    ) -> Result<EventQuery, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut query = EventQuery::scoped(admin_scope(principal), principal.id)
            .page(self.page.unwrap_or(1), page_size);

        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            match category.parse::<EventCategory>() {
                Ok(category) => query.category = Some(category),
                Err(e) => errors.add("category", e.to_string()),
            }
        }
        query.is_private = self.is_private;
        query.search = self
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string);

        match (self.year, self.month) {
            (None, Some(_)) => errors.add("month", "A month needs a year."),
            (Some(_), Some(month)) if !(1..=12).contains(&month) => {
                errors.add("month", "Enter a month between 1 and 12.");
            }
            (Some(year), month) => query.date = Some(DateDrill { year, month }),
            (None, None) => {}
        }

        errors.into_result()?;
        Ok(query)
    }
}

/// ## Summary
/// Lists the events in the principal's admin scope.
///
/// ## Errors
/// Returns `Denied(Admin)` for non-staff, `Validation` for bad filters and
/// `NotFound` for page zero or a page past the last one.
#[tracing::instrument(skip(store, principal), fields(principal = %principal.id))]
pub async fn admin_list(
    store: &dyn EventStore,
    principal: &Principal,
    filter: &AdminFilter,
) -> ServiceResult<EventListing> {
    require(principal, &Operation::Admin)?;
    let query = filter.to_query(principal, ADMIN_PAGE_SIZE)?;
    let page = filter.page.unwrap_or(1);
    if page == 0 {
        return Err(ServiceError::NotFound("page 0".to_string()));
    }

    let result = store.list_where(&query).await?;
    if page > page_count(result.total, ADMIN_PAGE_SIZE) {
        return Err(ServiceError::NotFound(format!("page {page}")));
    }
    Ok(EventListing::new(
        result.events,
        page,
        ADMIN_PAGE_SIZE,
        result.total,
    ))
}

/// ## Summary
/// Returns an event inside the principal's admin scope.
///
/// ## Errors
/// Returns `Denied(Admin)` for non-staff and `EventNotFound` for events
/// that are missing or outside the scope.
pub async fn admin_get(
    store: &dyn EventStore,
    principal: &Principal,
    id: uuid::Uuid,
) -> ServiceResult<EventWithAttendees> {
    require(principal, &Operation::Admin)?;
    let event = load(store, id).await?;
    if admin_scope(principal).admits(principal.id, &event) {
        Ok(event)
    } else {
        tracing::debug!(event_id = %id, "Event outside admin scope");
        Err(ServiceError::EventNotFound(id))
    }
}

/// ## Summary
/// Creates an event from the admin panel, organized by the acting principal.
///
/// ## Errors
/// Returns `Denied(Admin)`, `Denied(Create)` or `Validation`.
#[tracing::instrument(skip(store, principal, form), fields(principal = %principal.id))]
pub async fn admin_create(
    store: &dyn EventStore,
    principal: &Principal,
    form: &EventForm,
) -> ServiceResult<EventWithAttendees> {
    require(principal, &Operation::Admin)?;
    require(principal, &Operation::Create)?;
    let fields = validated_fields(store, form).await?;

    let event = store
        .create(&fields, principal.id)
        .await
        .map_err(write_error)?;
    tracing::info!(event_id = %event.id(), "Event created from admin panel");
    Ok(event)
}

/// ## Summary
/// Changes an event from the admin panel. The organizer is not editable.
///
/// ## Errors
/// Returns `EventNotFound`, `Denied(Edit)` or `Validation`.
#[tracing::instrument(skip(store, principal, form), fields(principal = %principal.id))]
pub async fn admin_update(
    store: &dyn EventStore,
    principal: &Principal,
    id: uuid::Uuid,
    form: &EventForm,
) -> ServiceResult<EventWithAttendees> {
    let event = admin_get(store, principal, id).await?;
    require(principal, &Operation::Edit(&event))?;
    let fields = validated_fields(store, form).await?;

    let updated = store.update(&event, &fields).await.map_err(write_error)?;
    tracing::info!(event_id = %id, "Event changed from admin panel");
    Ok(updated)
}

/// ## Summary
/// Deletes an event from the admin panel.
///
/// ## Errors
/// Returns `EventNotFound` or `Denied(Delete)`.
#[tracing::instrument(skip(store, principal), fields(principal = %principal.id))]
pub async fn admin_delete(
    store: &dyn EventStore,
    principal: &Principal,
    id: uuid::Uuid,
) -> ServiceResult<()> {
    let event = admin_get(store, principal, id).await?;
    require(principal, &Operation::Delete(&event))?;

    store.delete(&event).await?;
    tracing::info!(event_id = %id, "Event deleted from admin panel");
    Ok(())
}
