//! Path and query parameter helpers shared by the handlers.

use evento_service::error::ServiceError;
use salvo::Request;

use crate::error::AppResult;

/// ## Summary
/// Reads the `{id}` path segment of an event route.
///
/// ## Errors
/// Returns `NotFound` if the segment is not a UUID.
pub fn event_id(req: &Request) -> AppResult<uuid::Uuid> {
    uuid_param(req, "id", "event")
}

/// ## Summary
/// Reads a UUID path segment.
///
/// ## Errors
/// Returns `NotFound` naming `what` if the segment is missing or malformed.
pub fn uuid_param(req: &Request, name: &str, what: &str) -> AppResult<uuid::Uuid> {
    req.param::<String>(name)
        .and_then(|raw| uuid::Uuid::parse_str(&raw).ok())
        .ok_or_else(|| ServiceError::NotFound(what.to_string()).into())
}

/// ## Summary
/// Reads the `page` query parameter; absent means the first page.
///
/// ## Errors
/// Returns `NotFound` for a value that is not a positive number.
pub fn page(req: &Request) -> AppResult<u32> {
    match req.query::<String>("page") {
        None => Ok(1),
        Some(raw) => raw
            .parse::<u32>()
            .ok()
            .filter(|page| *page >= 1)
            .ok_or_else(|| ServiceError::NotFound(format!("page {raw}")).into()),
    }
}
