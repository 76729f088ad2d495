use salvo::Depot;
use salvo::http::StatusCode;
use tracing::error;

use crate::config::get_config_from_depot;
use crate::error::{AppError, AppResult};
use crate::store_handler::get_account_store_from_depot;
use evento_core::policy::Identity;
use evento_service::auth::casbin::get_enforcer_from_depot;
use evento_service::auth::depot::set_identity;
use evento_service::auth::{get_identity_from_depot, load_principal, session};
use evento_service::error::ServiceError;

/// ## Summary
/// Resolves the request identity from the session cookie.
///
/// ## Errors
/// Returns an error if the stores, the enforcer or the configuration are
/// missing from the depot, or if a lookup fails.
async fn resolve_identity(req: &salvo::Request, depot: &Depot) -> AppResult<Identity> {
    let config = get_config_from_depot(depot)?;
    let Some(token) = req
        .cookie(&config.auth.session_cookie)
        .map(|cookie| cookie.value().to_string())
    else {
        return Ok(Identity::Anonymous);
    };

    let accounts = get_account_store_from_depot(depot)?;
    let Some(user) = session::resolve_session(accounts.as_ref(), &token).await? else {
        return Ok(Identity::Anonymous);
    };

    let enforcer = get_enforcer_from_depot(depot)?;
    let principal = load_principal(accounts.as_ref(), &enforcer, &user).await?;
    Ok(Identity::Authenticated(principal))
}

/// ## Summary
/// Authentication middleware that resolves the session cookie and stores
/// the identity in the depot. Requests without a valid session continue as
/// anonymous.
///
/// ## Side Effects
/// Inserts the identity into the depot for downstream handlers.
///
/// ## Errors
/// Returns an HTTP 500 response if the identity cannot be resolved.
#[salvo::async_trait]
impl salvo::Handler for AuthMiddleware {
    #[tracing::instrument(skip(self, req, depot, res, ctrl), fields(
        method = %req.method(),
        path = %req.uri().path()
    ))]
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        res: &mut salvo::Response,
        ctrl: &mut salvo::FlowCtrl,
    ) {
        tracing::trace!("Authenticating request");

        match resolve_identity(req, depot).await {
            Ok(identity) => {
                if let Some(principal) = identity.principal() {
                    tracing::debug!(user_id = %principal.id, "Request authenticated");
                }
                set_identity(depot, identity);
            }
            Err(e) => {
                error!(error = ?e, "Failed to resolve request identity");
                res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
                res.body("Internal Server Error");
                ctrl.skip_rest();
            }
        }
    }
}

/// ## Summary
/// Middleware handler for authentication.
pub struct AuthMiddleware;

/// ## Summary
/// Guard for routes that need a signed-in user. Anonymous requests are
/// redirected to the login page with the original path as `next`.
pub struct LoginRequired;

#[salvo::async_trait]
impl salvo::Handler for LoginRequired {
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        res: &mut salvo::Response,
        ctrl: &mut salvo::FlowCtrl,
    ) {
        if get_identity_from_depot(depot).is_authenticated() {
            return;
        }
        salvo::Writer::write(
            AppError::from(ServiceError::NotAuthenticated),
            req,
            depot,
            res,
        )
        .await;
        ctrl.skip_rest();
    }
}
