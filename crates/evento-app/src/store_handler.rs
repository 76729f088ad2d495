use std::sync::Arc;

use salvo::async_trait;

use crate::error::AppResult;
use evento_core::error::CoreError;
use evento_db::db::store::{AccountStore, EventStore};

/// Injects the event and account stores into the depot.
pub struct StoreHandler {
    pub events: Arc<dyn EventStore>,
    pub accounts: Arc<dyn AccountStore>,
}

#[async_trait]
impl salvo::Handler for StoreHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(self.events.clone());
        depot.inject(self.accounts.clone());
    }
}

/// ## Summary
/// Retrieves the event store from the depot.
///
/// ## Errors
/// Returns an error if the event store is not found in the depot.
pub fn get_event_store_from_depot(depot: &salvo::Depot) -> AppResult<Arc<dyn EventStore>> {
    depot
        .obtain::<Arc<dyn EventStore>>()
        .cloned()
        .map_err(|_err| CoreError::InvariantViolation("Event store not found in depot").into())
}

/// ## Summary
/// Retrieves the account store from the depot.
///
/// ## Errors
/// Returns an error if the account store is not found in the depot.
pub fn get_account_store_from_depot(depot: &salvo::Depot) -> AppResult<Arc<dyn AccountStore>> {
    depot
        .obtain::<Arc<dyn AccountStore>>()
        .cloned()
        .map_err(|_err| CoreError::InvariantViolation("Account store not found in depot").into())
}
