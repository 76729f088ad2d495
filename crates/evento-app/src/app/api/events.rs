//! The public event pages: list, detail, create, edit and delete.
//!
//! Changes answer `303 See Other` to the event list, the way a browser form
//! submission expects.

use evento_core::constants::{EVENT_LIST_ROUTE, EVENTS_ROUTE_COMPONENT};
use evento_service::auth::get_principal_from_depot;
use evento_service::event::{EventForm, service};
use salvo::writing::Json;
use salvo::{Depot, Request, Response, Router, handler};
use serde_json::json;

use super::params;
use crate::config::get_config_from_depot;
use crate::error::{AppResult, see_other};
use crate::store_handler::get_event_store_from_depot;

/// ## Summary
/// GET / - One page of the events the user may see, newest first.
///
/// ## Errors
/// Answers 404 for a page past the last one.
#[handler]
async fn list_events(req: &mut Request, depot: &mut Depot, res: &mut Response) -> AppResult<()> {
    let page = params::page(req)?;
    let config = get_config_from_depot(depot)?;
    let principal = get_principal_from_depot(depot)?;
    let store = get_event_store_from_depot(depot)?;

    let listing =
        service::list_events(store.as_ref(), principal, page, config.app.page_size).await?;
    res.render(Json(listing));
    Ok(())
}

/// ## Summary
/// POST /events - Creates an event organized by the user.
///
/// ## Side Effects
/// Inserts the event and its attendees.
///
/// ## Errors
/// Redirects to the access denied page without the organize permission;
/// answers 400 for invalid fields.
#[handler]
async fn create_event(req: &mut Request, depot: &mut Depot, res: &mut Response) -> AppResult<()> {
    let form = req.parse_body::<EventForm>().await?;
    let principal = get_principal_from_depot(depot)?;
    let store = get_event_store_from_depot(depot)?;

    service::create_event(store.as_ref(), principal, &form).await?;
    see_other(res, EVENT_LIST_ROUTE);
    Ok(())
}

/// ## Summary
/// GET /events/{id} - A single event, if the user may view it.
#[handler]
async fn event_detail(req: &mut Request, depot: &mut Depot, res: &mut Response) -> AppResult<()> {
    let id = params::event_id(req)?;
    let principal = get_principal_from_depot(depot)?;
    let store = get_event_store_from_depot(depot)?;

    let event = service::get_event(store.as_ref(), principal, id).await?;
    res.render(Json(event));
    Ok(())
}

/// ## Summary
/// GET /events/{id}/edit - The current values, if the user may edit.
#[handler]
async fn edit_form(req: &mut Request, depot: &mut Depot, res: &mut Response) -> AppResult<()> {
    let id = params::event_id(req)?;
    let principal = get_principal_from_depot(depot)?;
    let store = get_event_store_from_depot(depot)?;

    let event = service::event_for_edit(store.as_ref(), principal, id).await?;
    res.render(Json(event));
    Ok(())
}

/// ## Summary
/// POST /events/{id}/edit - Updates the event. The organizer is kept.
///
/// ## Side Effects
/// Rewrites the event and replaces its attendees.
#[handler]
async fn update_event(req: &mut Request, depot: &mut Depot, res: &mut Response) -> AppResult<()> {
    let id = params::event_id(req)?;
    let form = req.parse_body::<EventForm>().await?;
    let principal = get_principal_from_depot(depot)?;
    let store = get_event_store_from_depot(depot)?;

    service::update_event(store.as_ref(), principal, id, &form).await?;
    see_other(res, EVENT_LIST_ROUTE);
    Ok(())
}

/// ## Summary
/// GET /events/{id}/delete - Asks for confirmation, if the user may delete.
#[handler]
async fn delete_confirm(req: &mut Request, depot: &mut Depot, res: &mut Response) -> AppResult<()> {
    let id = params::event_id(req)?;
    let principal = get_principal_from_depot(depot)?;
    let store = get_event_store_from_depot(depot)?;

    let event = service::event_for_delete(store.as_ref(), principal, id).await?;
    res.render(Json(json!({ "confirm": true, "event": event })));
    Ok(())
}

/// ## Summary
/// POST /events/{id}/delete - Deletes the event.
///
/// ## Side Effects
/// Removes the event and its attendees.
#[handler]
async fn delete_event(req: &mut Request, depot: &mut Depot, res: &mut Response) -> AppResult<()> {
    let id = params::event_id(req)?;
    let principal = get_principal_from_depot(depot)?;
    let store = get_event_store_from_depot(depot)?;

    service::delete_event(store.as_ref(), principal, id).await?;
    see_other(res, EVENT_LIST_ROUTE);
    Ok(())
}

#[must_use]
pub fn routes() -> Router {
    Router::new().get(list_events).push(
        Router::with_path(EVENTS_ROUTE_COMPONENT)
            .post(create_event)
            .push(
                Router::with_path("{id}")
                    .get(event_detail)
                    .push(Router::with_path("edit").get(edit_form).post(update_event))
                    .push(
                        Router::with_path("delete")
                            .get(delete_confirm)
                            .post(delete_event),
                    ),
            ),
    )
}
