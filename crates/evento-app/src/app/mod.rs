pub mod api;

use std::sync::Arc;

use evento_core::config::Settings;
use evento_db::db::store::{AccountStore, EventStore};
use evento_service::auth::casbin::CasbinEnforcerHandler;
use salvo::Router;
use salvo::logging::Logger;

use crate::config::ConfigHandler;
use crate::store_handler::StoreHandler;

/// Everything a running application needs, already constructed.
pub struct AppState {
    pub settings: Arc<Settings>,
    pub events: Arc<dyn EventStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub enforcer: Arc<casbin::Enforcer>,
}

/// ## Summary
/// Builds the root router: request logging, depot injection and all routes.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .hoop(Logger::new())
        .hoop(ConfigHandler {
            settings: state.settings,
        })
        .hoop(StoreHandler {
            events: state.events,
            accounts: state.accounts,
        })
        .hoop(CasbinEnforcerHandler {
            enforcer: state.enforcer,
        })
        .push(api::routes())
}
