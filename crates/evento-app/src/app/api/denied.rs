use evento_core::constants::ACCESS_DENIED_ROUTE_COMPONENT;
use evento_core::policy::Action;
use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Request, Response, Router, handler};
use serde_json::json;

const GENERIC_DENIAL: &str = "You do not have permission to perform this action.";

/// ## Summary
/// GET /access-denied - Explains a denial. Always answers 403.
#[handler]
async fn access_denied(req: &mut Request, res: &mut Response) {
    let action = req
        .query::<String>("reason")
        .and_then(|reason| Action::from_str_opt(&reason));

    res.status_code(StatusCode::FORBIDDEN);
    res.render(Json(json!({
        "error": "access_denied",
        "action": action.map(Action::as_str),
        "message": action.map_or(GENERIC_DENIAL, Action::denial_message),
    })));
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(ACCESS_DENIED_ROUTE_COMPONENT).get(access_denied)
}
