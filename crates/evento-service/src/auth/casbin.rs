//! Permission grants stored as Casbin policies.
//!
//! A policy line `p, <subject>, <permission tag>` grants the tag to a user
//! (`user:<id>`) or to every member of a group (`group:<name>`).

use std::collections::BTreeSet;
use std::sync::Arc;

use casbin::{CoreApi, MgmtApi};
use evento_core::constants::{MANAGERS_GROUP, ORGANIZERS_GROUP};
use evento_core::types::PermissionTag;
use evento_db::db::connection::DbPool;
use salvo::async_trait;

use super::subject::{ExpandedSubjects, Subject};
use crate::error::{ServiceError, ServiceResult};

pub const CASBIN_MODEL: &str = include_str!("casbin_model.conf");

/// ## Summary
/// Loads the Casbin model shipped with the service.
///
/// ## Errors
/// Returns an error if the model text cannot be parsed.
pub async fn load_model() -> ServiceResult<casbin::DefaultModel> {
    Ok(casbin::DefaultModel::from_str(CASBIN_MODEL).await?)
}

/// ## Summary
/// Initialize a Casbin enforcer with a Diesel adapter using the provided connection pool.
///
/// ## Errors
/// Returns an error if the model, the adapter or the enforcer cannot be created.
#[tracing::instrument(skip(pool))]
pub async fn init_casbin(pool: DbPool) -> ServiceResult<casbin::Enforcer> {
    tracing::debug!("Initializing Casbin enforcer");

    let model = load_model().await?;
    tracing::debug!("Casbin model loaded");

    let adapter = diesel_async_adapter::DieselAdapter::with_pool(pool).await?;
    tracing::debug!("Casbin adapter created");

    let enforcer = casbin::Enforcer::new(model, adapter).await?;

    tracing::info!(
        policy_count = enforcer.get_policy().len(),
        "Casbin enforcer initialized successfully"
    );
    Ok(enforcer)
}

/// The grants every installation starts with.
#[must_use]
pub fn default_grants() -> Vec<(Subject, PermissionTag)> {
    vec![
        (
            Subject::Group(ORGANIZERS_GROUP.to_string()),
            PermissionTag::OrganizeEvents,
        ),
        (
            Subject::Group(MANAGERS_GROUP.to_string()),
            PermissionTag::ManageEvents,
        ),
    ]
}

/// ## Summary
/// Adds each of [`default_grants`] that the enforcer does not already hold.
///
/// ## Side Effects
/// Persists new policies through the enforcer's adapter when auto-save is on.
///
/// ## Errors
/// Returns an error if a policy cannot be added.
#[tracing::instrument(skip(enforcer))]
pub async fn seed_default_grants(enforcer: &mut casbin::Enforcer) -> ServiceResult<usize> {
    let mut added = 0;
    for (subject, tag) in default_grants() {
        let rule = vec![subject.casbin_subject(), tag.as_str().to_string()];
        if !enforcer.has_policy(rule.clone()) && enforcer.add_policy(rule).await? {
            tracing::info!(%subject, permission = %tag, "Seeded permission grant");
            added += 1;
        }
    }
    Ok(added)
}

/// ## Summary
/// Returns the permission tags granted to any of the expanded subjects.
///
/// ## Errors
/// Returns an error if Casbin enforcement fails.
pub fn granted_permissions(
    enforcer: &casbin::Enforcer,
    subjects: &ExpandedSubjects,
) -> ServiceResult<BTreeSet<PermissionTag>> {
    let subjects = subjects.casbin_subjects();
    let mut granted = BTreeSet::new();

    for tag in PermissionTag::ALL {
        for subject in &subjects {
            if enforcer.enforce((subject.as_str(), tag.as_str()))? {
                granted.insert(tag);
                break;
            }
        }
    }

    tracing::trace!(?subjects, ?granted, "Resolved permission grants");
    Ok(granted)
}

pub struct CasbinEnforcerHandler {
    pub enforcer: Arc<casbin::Enforcer>,
}

#[async_trait]
impl salvo::Handler for CasbinEnforcerHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(self.enforcer.clone());
    }
}

/// ## Summary
/// Retrieves the Casbin enforcer from the depot.
///
/// ## Errors
/// Returns an error if the Casbin enforcer is not found in the depot.
pub fn get_enforcer_from_depot(depot: &salvo::Depot) -> ServiceResult<Arc<casbin::Enforcer>> {
    depot
        .obtain::<Arc<casbin::Enforcer>>()
        .cloned()
        .map_err(|_err| ServiceError::InvariantViolation("Casbin enforcer not found in depot"))
}
