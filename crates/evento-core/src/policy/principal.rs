use std::collections::BTreeSet;

use serde::Serialize;

use crate::types::PermissionTag;

/// An authenticated actor as seen by the access policy.
///
/// Permissions are the explicit grants only; superuser status is carried
/// separately and each rule decides what it implies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: uuid::Uuid,
    pub username: String,
    pub is_superuser: bool,
    pub is_staff: bool,
    pub permissions: BTreeSet<PermissionTag>,
    pub groups: BTreeSet<String>,
}

impl Principal {
    /// Create a principal with no privileges.
    #[must_use]
    pub fn new(id: uuid::Uuid, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            is_superuser: false,
            is_staff: false,
            permissions: BTreeSet::new(),
            groups: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_permission(mut self, tag: PermissionTag) -> Self {
        self.permissions.insert(tag);
        self
    }

    #[must_use]
    pub const fn superuser(mut self) -> Self {
        self.is_superuser = true;
        self.is_staff = true;
        self
    }

    #[must_use]
    pub const fn staff(mut self) -> Self {
        self.is_staff = true;
        self
    }

    /// Returns `true` if the permission was explicitly granted.
    #[must_use]
    pub fn has_permission(&self, tag: PermissionTag) -> bool {
        self.permissions.contains(&tag)
    }
}

/// Who is making a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Authenticated(Principal),
    Anonymous,
}

impl Identity {
    #[must_use]
    pub const fn principal(&self) -> Option<&Principal> {
        match self {
            Self::Authenticated(principal) => Some(principal),
            Self::Anonymous => None,
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}
