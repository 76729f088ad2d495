use evento_core::policy::Action;
use thiserror::Error;

use crate::validation::ValidationErrors;

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Casbin error: {0}")]
    CasbinError(#[from] casbin::Error),

    #[error(transparent)]
    DatabaseError(#[from] evento_db::error::DbError),

    #[error(transparent)]
    CoreError(#[from] evento_core::error::CoreError),

    #[error("Background task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Access denied: {0}")]
    Denied(Action),

    #[error("Event not found: {0}")]
    EventNotFound(uuid::Uuid),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
