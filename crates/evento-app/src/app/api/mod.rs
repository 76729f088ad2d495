mod account;
mod admin;
mod app_specific;
mod dashboard;
mod denied;
mod events;
mod params;

use salvo::Router;

use crate::middleware::auth::{AuthMiddleware, LoginRequired};

/// ## Summary
/// Constructs the router with every page and the admin panel.
///
/// Pages other than login, registration, the access denied page and the
/// app endpoints require a signed-in user.
#[must_use]
pub fn routes() -> Router {
    Router::new()
        .hoop(AuthMiddleware)
        .push(app_specific::routes())
        .push(account::public_routes())
        .push(denied::routes())
        .push(
            Router::new()
                .hoop(LoginRequired)
                .push(account::private_routes())
                .push(dashboard::routes())
                .push(events::routes())
                .push(admin::routes()),
        )
}
