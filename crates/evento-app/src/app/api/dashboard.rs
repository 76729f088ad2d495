use evento_service::auth::get_principal_from_depot;
use evento_service::event::service;
use salvo::writing::Json;
use salvo::{Depot, Response, Router, handler};

use crate::error::AppResult;
use crate::store_handler::get_event_store_from_depot;

/// ## Summary
/// GET /dashboard - The signed-in user, their roles, and the events they
/// organize and attend.
#[handler]
async fn dashboard(depot: &mut Depot, res: &mut Response) -> AppResult<()> {
    let principal = get_principal_from_depot(depot)?;
    let store = get_event_store_from_depot(depot)?;

    let view = service::dashboard(store.as_ref(), principal).await?;
    res.render(Json(view));
    Ok(())
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("dashboard").get(dashboard)
}
