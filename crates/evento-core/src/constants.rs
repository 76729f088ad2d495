/// Route constants shared across crates
pub const EVENT_LIST_ROUTE: &str = "/";

pub const EVENTS_ROUTE_COMPONENT: &str = "events";
pub const EVENTS_ROUTE_PREFIX: &str = const_str::concat!("/", EVENTS_ROUTE_COMPONENT);

pub const LOGIN_ROUTE_COMPONENT: &str = "login";
pub const LOGIN_ROUTE: &str = const_str::concat!("/", LOGIN_ROUTE_COMPONENT);

pub const ACCESS_DENIED_ROUTE_COMPONENT: &str = "access-denied";
pub const ACCESS_DENIED_ROUTE: &str = const_str::concat!("/", ACCESS_DENIED_ROUTE_COMPONENT);

pub const ADMIN_ROUTE_COMPONENT: &str = "admin";
pub const ADMIN_ROUTE_PREFIX: &str = const_str::concat!("/", ADMIN_ROUTE_COMPONENT);
pub const ADMIN_EVENTS_ROUTE: &str = const_str::concat!(ADMIN_ROUTE_PREFIX, "/", EVENTS_ROUTE_COMPONENT);

/// Query parameter carrying the post-login destination.
pub const NEXT_PARAM: &str = "next";

pub const DEFAULT_SESSION_COOKIE: &str = "evento_session";

/// Group every newly registered user joins.
pub const ATTENDEES_GROUP: &str = "attendees";
/// Group granted `events.organize` at startup.
pub const ORGANIZERS_GROUP: &str = "organizers";
/// Group granted `events.manage` at startup.
pub const MANAGERS_GROUP: &str = "managers";

/// ## Summary
/// Builds the path of a single event page.
#[must_use]
pub fn event_path(id: uuid::Uuid) -> String {
    format!("{EVENTS_ROUTE_PREFIX}/{id}")
}
