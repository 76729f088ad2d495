//! Loaded settings, shared with handlers through the depot.

use std::sync::Arc;

use evento_core::error::CoreError;
use salvo::{Depot, FlowCtrl, Handler, Request, Response, async_trait};

pub use evento_core::config::*;

use crate::error::AppResult;

/// Hoop placing the application [`Settings`] in every request's depot.
pub struct ConfigHandler {
    pub settings: Arc<Settings>,
}

#[async_trait]
impl Handler for ConfigHandler {
    async fn handle(
        &self,
        _req: &mut Request,
        depot: &mut Depot,
        _res: &mut Response,
        _ctrl: &mut FlowCtrl,
    ) {
        depot.inject(Arc::clone(&self.settings));
    }
}

/// ## Summary
/// Returns the settings placed in the depot by [`ConfigHandler`].
///
/// ## Errors
/// Returns `InvariantViolation` when the hoop was not mounted.
pub fn get_config_from_depot(depot: &Depot) -> AppResult<Arc<Settings>> {
    match depot.obtain::<Arc<Settings>>() {
        Ok(settings) => Ok(Arc::clone(settings)),
        Err(_) => Err(CoreError::InvariantViolation("settings missing from the depot").into()),
    }
}
