//! Registration, login and logout.

use evento_core::constants::{LOGIN_ROUTE, NEXT_PARAM};
use evento_service::account::{self, LoginForm, RegisterForm, safe_next};
use salvo::http::cookie::time::Duration;
use salvo::http::cookie::{Cookie, SameSite};
use salvo::writing::Json;
use salvo::{Depot, Request, Response, Router, handler};
use serde_json::json;

use crate::config::{AuthConfig, get_config_from_depot};
use crate::error::{AppResult, see_other};
use crate::store_handler::get_account_store_from_depot;

fn session_cookie(auth: &AuthConfig, value: String, max_age: Duration) -> Cookie<'static> {
    Cookie::build((auth.session_cookie.clone(), value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(auth.secure_cookies)
        .max_age(max_age)
        .build()
}

/// ## Summary
/// GET /register - Describes the registration form.
#[handler]
async fn register_form(res: &mut Response) {
    res.render(Json(json!({
        "fields": ["username", "email", "first_name", "last_name", "password", "password2"],
    })));
}

/// ## Summary
/// POST /register - Creates an account and sends the user to the login page.
///
/// ## Side Effects
/// - Creates a user row and its password credential
/// - Adds the user to the attendees group
///
/// ## Errors
/// Answers 400 with per-field messages for invalid input or a taken username.
#[handler]
async fn register(req: &mut Request, depot: &mut Depot, res: &mut Response) -> AppResult<()> {
    let form = req.parse_body::<RegisterForm>().await?;
    let accounts = get_account_store_from_depot(depot)?;

    account::register(accounts.as_ref(), &form).await?;
    see_other(res, LOGIN_ROUTE);
    Ok(())
}

/// ## Summary
/// GET /login - Describes the login form and where it returns to.
#[handler]
async fn login_form(req: &mut Request, res: &mut Response) {
    let next = req.query::<String>(NEXT_PARAM);
    res.render(Json(json!({
        "fields": ["username", "password"],
        "next": safe_next(next.as_deref()),
    })));
}

/// ## Summary
/// POST /login - Checks credentials, sets the session cookie and redirects
/// to `next` (or the event list).
///
/// ## Side Effects
/// Inserts a session row and sets the session cookie.
///
/// ## Errors
/// Answers 400 for bad credentials.
#[handler]
async fn login(req: &mut Request, depot: &mut Depot, res: &mut Response) -> AppResult<()> {
    let form = req.parse_body::<LoginForm>().await?;
    let next = req.query::<String>(NEXT_PARAM);
    let config = get_config_from_depot(depot)?;
    let accounts = get_account_store_from_depot(depot)?;

    let (_user, session) =
        account::login(accounts.as_ref(), &form, config.auth.session_ttl_hours).await?;

    res.add_cookie(session_cookie(
        &config.auth,
        session.token,
        Duration::hours(i64::from(config.auth.session_ttl_hours)),
    ));
    see_other(res, safe_next(next.as_deref()));
    Ok(())
}

/// ## Summary
/// GET|POST /logout - Ends the session and returns to the login page.
///
/// ## Side Effects
/// Deletes the session row and expires the cookie.
#[handler]
async fn logout(req: &mut Request, depot: &mut Depot, res: &mut Response) -> AppResult<()> {
    let config = get_config_from_depot(depot)?;
    let accounts = get_account_store_from_depot(depot)?;
    let token = req
        .cookie(&config.auth.session_cookie)
        .map(|cookie| cookie.value().to_string());

    account::logout(accounts.as_ref(), token.as_deref()).await?;

    res.add_cookie(session_cookie(&config.auth, String::new(), Duration::ZERO));
    see_other(res, LOGIN_ROUTE);
    Ok(())
}

/// Routes reachable without a session.
#[must_use]
pub fn public_routes() -> Router {
    Router::new()
        .push(Router::with_path("register").get(register_form).post(register))
        .push(Router::with_path("login").get(login_form).post(login))
}

/// Routes that need a session.
#[must_use]
pub fn private_routes() -> Router {
    Router::with_path("logout").get(logout).post(logout)
}
