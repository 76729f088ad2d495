//! Event operations, each gated by the access policy.
//!
//! ## Module Organization
//!
//! - `admin`: the admin panel listing, filters and changes
//! - `form`: parsing and validation of submitted event fields
//! - `service`: list, view, create, edit, delete and the dashboard

pub mod admin;
pub mod form;
pub mod service;

pub use form::EventForm;
pub use service::{Dashboard, EventListing};
