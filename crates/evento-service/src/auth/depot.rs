//! Depot helpers for the identity resolved by the auth middleware.

use evento_core::policy::{Identity, Principal};

use crate::error::{ServiceError, ServiceResult};

pub mod depot_keys {
    pub const IDENTITY: &str = "__identity";
}

static ANONYMOUS: Identity = Identity::Anonymous;

/// Stores the resolved identity for downstream handlers.
pub fn set_identity(depot: &mut salvo::Depot, identity: Identity) {
    depot.insert(depot_keys::IDENTITY, identity);
}

/// Get the request identity from the depot.
///
/// A depot without an identity is treated as anonymous.
#[must_use]
pub fn get_identity_from_depot(depot: &salvo::Depot) -> &Identity {
    depot
        .get::<Identity>(depot_keys::IDENTITY)
        .unwrap_or_else(|_missing| {
            tracing::warn!("Depot missing identity; treating request as anonymous");
            &ANONYMOUS
        })
}

/// Get the authenticated principal from the depot.
///
/// ## Errors
///
/// Returns `NotAuthenticated` if the request is anonymous.
pub fn get_principal_from_depot(depot: &salvo::Depot) -> ServiceResult<&Principal> {
    get_identity_from_depot(depot)
        .principal()
        .ok_or(ServiceError::NotAuthenticated)
}
