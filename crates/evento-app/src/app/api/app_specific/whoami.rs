use salvo::prelude::Json;
use salvo::{Depot, Router, handler};
use serde_json::json;

use evento_core::policy::Identity;
use evento_service::auth::get_identity_from_depot;

/// ## Summary
/// Returns the principal resolved by the `AuthMiddleware` as JSON.
#[handler]
async fn whoami(depot: &Depot) -> Json<serde_json::Value> {
    match get_identity_from_depot(depot) {
        Identity::Authenticated(principal) => {
            Json(serde_json::to_value(principal).unwrap_or(json!(null)))
        }
        Identity::Anonymous => Json(json!({ "status": "anonymous" })),
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("whoami").get(whoami)
}
