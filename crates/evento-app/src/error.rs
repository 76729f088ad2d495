//! Application-level errors and how they are presented over HTTP.
//!
//! | Outcome | Response |
//! |---|---|
//! | not authenticated | 303 to the login page, carrying `next` |
//! | denied | 303 to the access denied page, carrying `reason` |
//! | missing event | 404, or the denial redirect when missing events are concealed |
//! | validation | 400 with per-field messages |
//! | conflict | 409 |
//! | store unavailable | 503 |
//! | anything else | 500 |

use evento_core::constants::{ACCESS_DENIED_ROUTE, LOGIN_ROUTE, NEXT_PARAM};
use evento_core::policy::Action;
use evento_db::error::DbError;
use evento_service::error::ServiceError;
use salvo::http::StatusCode;
use salvo::http::header::{HeaderValue, LOCATION};
use salvo::writing::Json;
use salvo::{Depot, Request, Response, Writer, async_trait};
use serde_json::json;
use thiserror::Error;

use crate::config::get_config_from_depot;

/// Application-level errors (HTTP layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] ServiceError),

    #[error(transparent)]
    DatabaseError(#[from] DbError),

    #[error(transparent)]
    CoreError(#[from] evento_core::error::CoreError),

    #[error("Malformed request: {0}")]
    ParseError(#[from] salvo::http::ParseError),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

/// ## Summary
/// Answers with `303 See Other` to a local path.
pub fn see_other(res: &mut Response, location: &str) {
    let value = HeaderValue::from_str(location).unwrap_or_else(|_invalid| {
        tracing::warn!(location, "Refusing to redirect to an invalid location");
        HeaderValue::from_static("/")
    });
    res.status_code(StatusCode::SEE_OTHER);
    res.headers_mut().insert(LOCATION, value);
}

/// The login page URL that returns to `next` afterwards.
#[must_use]
pub fn login_url(next: &str) -> String {
    format!("{LOGIN_ROUTE}?{NEXT_PARAM}={}", urlencoding::encode(next))
}

/// The access denied page URL for an action.
#[must_use]
pub fn denied_url(action: Action) -> String {
    format!("{ACCESS_DENIED_ROUTE}?reason={}", action.as_str())
}

fn request_target(req: &Request) -> String {
    req.uri()
        .path_and_query()
        .map_or_else(|| req.uri().path().to_string(), ToString::to_string)
}

fn render_json(res: &mut Response, status: StatusCode, body: serde_json::Value) {
    res.status_code(status);
    res.render(Json(body));
}

fn render_internal(res: &mut Response, status: StatusCode, error: &dyn std::fmt::Display) {
    tracing::error!(error = %error, "Request failed");
    render_json(
        res,
        status,
        json!({ "error": status.canonical_reason().unwrap_or("error") }),
    );
}

fn render_db_error(res: &mut Response, error: &DbError) {
    match error {
        DbError::PoolError(_) => render_internal(res, StatusCode::SERVICE_UNAVAILABLE, error),
        DbError::Conflict(what) => {
            render_json(res, StatusCode::CONFLICT, json!({ "error": "conflict", "detail": what }));
        }
        _ => render_internal(res, StatusCode::INTERNAL_SERVER_ERROR, error),
    }
}

#[async_trait]
impl Writer for AppError {
    async fn write(self, req: &mut Request, depot: &mut Depot, res: &mut Response) {
        match self {
            Self::ServiceError(ServiceError::NotAuthenticated) => {
                let target = request_target(req);
                tracing::debug!(%target, "Redirecting anonymous request to login");
                see_other(res, &login_url(&target));
            }
            Self::ServiceError(ServiceError::Denied(action)) => {
                see_other(res, &denied_url(action));
            }
            Self::ServiceError(ServiceError::EventNotFound(id)) => {
                let conceal = get_config_from_depot(depot)
                    .map_or(true, |settings| settings.app.conceal_missing_events);
                if conceal {
                    tracing::debug!(event_id = %id, "Concealing missing event as denied");
                    see_other(res, &denied_url(Action::View));
                } else {
                    render_json(
                        res,
                        StatusCode::NOT_FOUND,
                        json!({ "error": "not_found", "detail": "event not found" }),
                    );
                }
            }
            Self::ServiceError(ServiceError::NotFound(what)) => {
                render_json(
                    res,
                    StatusCode::NOT_FOUND,
                    json!({ "error": "not_found", "detail": what }),
                );
            }
            Self::ServiceError(ServiceError::Validation(errors)) => {
                render_json(
                    res,
                    StatusCode::BAD_REQUEST,
                    json!({ "error": "validation", "errors": errors }),
                );
            }
            Self::ServiceError(ServiceError::DatabaseError(e)) | Self::DatabaseError(e) => {
                render_db_error(res, &e);
            }
            Self::ParseError(e) => {
                tracing::debug!(error = %e, "Malformed request body");
                render_json(
                    res,
                    StatusCode::BAD_REQUEST,
                    json!({ "error": "malformed_request", "detail": e.to_string() }),
                );
            }
            other => render_internal(res, StatusCode::INTERNAL_SERVER_ERROR, &other),
        }
    }
}
