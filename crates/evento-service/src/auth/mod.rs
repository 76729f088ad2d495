//! Authentication and authorization flow.
//!
//! ## Module Organization
//!
//! - `casbin`: Casbin enforcer initialization, default grants and depot integration
//! - `depot`: Helpers for reading the request identity from the Salvo depot
//! - `identity`: Builds a policy `Principal` from a user, its groups and its grants
//! - `password`: Password hashing and verification with Argon2
//! - `session`: Cookie session tokens backed by the account store
//! - `subject`: Casbin subjects and group expansion

pub mod casbin;
pub mod depot;
pub mod identity;
pub mod password;
pub mod session;
pub mod subject;

pub use depot::{get_identity_from_depot, get_principal_from_depot};
pub use identity::load_principal;
pub use subject::{ExpandedSubjects, Subject};
