//! The admin panel: scoped event management and account roles.

use evento_core::constants::{ADMIN_ROUTE_COMPONENT, EVENTS_ROUTE_COMPONENT};
use evento_service::account;
use evento_service::auth::get_principal_from_depot;
use evento_service::event::EventForm;
use evento_service::event::admin::{self, AdminFilter};
use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Depot, Request, Response, Router, handler};
use serde_json::json;

use super::params;
use crate::error::AppResult;
use crate::store_handler::{get_account_store_from_depot, get_event_store_from_depot};

/// ## Summary
/// GET /admin/events - Filtered listing within the user's admin scope.
///
/// Query: `category`, `is_private`, `q`, `year`, `month`, `page`.
/// Answers 404 for a page that is not a positive number or past the last one.
#[handler]
async fn list(req: &mut Request, depot: &mut Depot, res: &mut Response) -> AppResult<()> {
    let page = params::page(req)?;
    let filter = AdminFilter {
        page: Some(page),
        ..req.parse_queries::<AdminFilter>()?
    };
    let principal = get_principal_from_depot(depot)?;
    let store = get_event_store_from_depot(depot)?;

    let listing = admin::admin_list(store.as_ref(), principal, &filter).await?;
    res.render(Json(listing));
    Ok(())
}

/// ## Summary
/// POST /admin/events - Creates an event organized by the acting user.
#[handler]
async fn create(req: &mut Request, depot: &mut Depot, res: &mut Response) -> AppResult<()> {
    let form = req.parse_body::<EventForm>().await?;
    let principal = get_principal_from_depot(depot)?;
    let store = get_event_store_from_depot(depot)?;

    let event = admin::admin_create(store.as_ref(), principal, &form).await?;
    res.status_code(StatusCode::CREATED);
    res.render(Json(event));
    Ok(())
}

#[handler]
async fn detail(req: &mut Request, depot: &mut Depot, res: &mut Response) -> AppResult<()> {
    let id = params::event_id(req)?;
    let principal = get_principal_from_depot(depot)?;
    let store = get_event_store_from_depot(depot)?;

    res.render(Json(admin::admin_get(store.as_ref(), principal, id).await?));
    Ok(())
}

/// ## Summary
/// POST /admin/events/{id} - Changes the event. The organizer is not editable.
#[handler]
async fn update(req: &mut Request, depot: &mut Depot, res: &mut Response) -> AppResult<()> {
    let id = params::event_id(req)?;
    let form = req.parse_body::<EventForm>().await?;
    let principal = get_principal_from_depot(depot)?;
    let store = get_event_store_from_depot(depot)?;

    let event = admin::admin_update(store.as_ref(), principal, id, &form).await?;
    res.render(Json(event));
    Ok(())
}

#[handler]
async fn delete(req: &mut Request, depot: &mut Depot, res: &mut Response) -> AppResult<()> {
    let id = params::event_id(req)?;
    let principal = get_principal_from_depot(depot)?;
    let store = get_event_store_from_depot(depot)?;

    admin::admin_delete(store.as_ref(), principal, id).await?;
    res.status_code(StatusCode::NO_CONTENT);
    Ok(())
}

/// ## Summary
/// PUT /admin/users/{id}/groups/{group} - Adds the user to the group.
#[handler]
async fn join_group(req: &mut Request, depot: &mut Depot, res: &mut Response) -> AppResult<()> {
    let user_id = params::uuid_param(req, "id", "user")?;
    let group = req.param::<String>("group").unwrap_or_default();
    let principal = get_principal_from_depot(depot)?;
    let accounts = get_account_store_from_depot(depot)?;

    account::assign_group(accounts.as_ref(), principal, user_id, &group).await?;
    res.status_code(StatusCode::NO_CONTENT);
    Ok(())
}

/// ## Summary
/// DELETE /admin/users/{id}/groups/{group} - Removes the user from the group.
#[handler]
async fn leave_group(req: &mut Request, depot: &mut Depot, res: &mut Response) -> AppResult<()> {
    let user_id = params::uuid_param(req, "id", "user")?;
    let group = req.param::<String>("group").unwrap_or_default();
    let principal = get_principal_from_depot(depot)?;
    let accounts = get_account_store_from_depot(depot)?;

    let removed = account::revoke_group(accounts.as_ref(), principal, user_id, &group).await?;
    res.render(Json(json!({ "removed": removed })));
    Ok(())
}

async fn change_staff(
    user_id: uuid::Uuid,
    depot: &Depot,
    res: &mut Response,
    is_staff: bool,
) -> AppResult<()> {
    let principal = get_principal_from_depot(depot)?;
    let accounts = get_account_store_from_depot(depot)?;

    let user = account::set_staff(accounts.as_ref(), principal, user_id, is_staff).await?;
    res.render(Json(user));
    Ok(())
}

/// ## Summary
/// PUT /admin/users/{id}/staff - Grants admin panel access.
#[handler]
async fn grant_staff(req: &mut Request, depot: &mut Depot, res: &mut Response) -> AppResult<()> {
    let user_id = params::uuid_param(req, "id", "user")?;
    change_staff(user_id, depot, res, true).await
}

/// ## Summary
/// DELETE /admin/users/{id}/staff - Revokes admin panel access.
#[handler]
async fn revoke_staff(req: &mut Request, depot: &mut Depot, res: &mut Response) -> AppResult<()> {
    let user_id = params::uuid_param(req, "id", "user")?;
    change_staff(user_id, depot, res, false).await
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(ADMIN_ROUTE_COMPONENT)
        .push(
            Router::with_path(EVENTS_ROUTE_COMPONENT)
                .get(list)
                .post(create)
                .push(
                    Router::with_path("{id}")
                        .get(detail)
                        .post(update)
                        .delete(delete),
                ),
        )
        .push(
            Router::with_path("users/{id}")
                .push(
                    Router::with_path("groups/{group}")
                        .put(join_group)
                        .delete(leave_group),
                )
                .push(Router::with_path("staff").put(grant_staff).delete(revoke_staff)),
        )
}
