//! Access policy for events.
//!
//! Every decision about who may see or change an event is made here. The
//! functions are pure: they read a [`Principal`] and, where relevant, an
//! [`AccessTarget`], and return a verdict. Loading the principal or the event
//! is the caller's job, and so is telling a missing event apart from a denied
//! one.
//!
//! ## Module Organization
//!
//! - `principal`: the acting identity and its granted permissions
//! - `rules`: one predicate per operation
//! - `scope`: which events a listing may cover

mod principal;
mod rules;
mod scope;


pub use principal::{Identity, Principal};
pub use rules::{
    admin_scope, can_access_admin, can_create, can_delete, can_edit, can_manage_accounts,
    can_view, check, is_admin, is_organizer, list_scope,
};
pub use scope::QueryScope;

/// The parts of an event the policy needs to see.
pub trait AccessTarget {
    fn is_private(&self) -> bool;

    fn organizer_id(&self) -> uuid::Uuid;

    fn has_attendee(&self, principal_id: uuid::Uuid) -> bool;
}

/// An operation a principal asks to perform.
pub enum Operation<'a, T: ?Sized> {
    View(&'a T),
    Create,
    Edit(&'a T),
    Delete(&'a T),
    Admin,
    ManageAccounts,
}

impl<T: ?Sized> Operation<'_, T> {
    #[must_use]
    pub const fn action(&self) -> Action {
        match self {
            Self::View(_) => Action::View,
            Self::Create => Action::Create,
            Self::Edit(_) => Action::Edit,
            Self::Delete(_) => Action::Delete,
            Self::Admin => Action::Admin,
            Self::ManageAccounts => Action::ManageAccounts,
        }
    }
}

/// The kind of an [`Operation`], without its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
    Admin,
    ManageAccounts,
}

impl Action {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::Admin => "admin",
            Self::ManageAccounts => "manage-accounts",
        }
    }

    /// ## Summary
    /// Parses the value produced by [`Action::as_str`].
    #[must_use]
    pub fn from_str_opt(s: &str) -> Option<Self> {
        [
            Self::View,
            Self::Create,
            Self::Edit,
            Self::Delete,
            Self::Admin,
            Self::ManageAccounts,
        ]
        .into_iter()
        .find(|action| action.as_str() == s)
    }

    /// Message shown on the access denied page.
    #[must_use]
    pub const fn denial_message(self) -> &'static str {
        match self {
            Self::View => "You do not have permission to view this private event.",
            Self::Create => "You do not have permission to create events.",
            Self::Edit => "You do not have permission to edit this event.",
            Self::Delete => "Only administrators can delete events.",
            Self::Admin => "You do not have access to the administration panel.",
            Self::ManageAccounts => "Only superusers can manage accounts.",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthzResult {
    /// Access is allowed.
    Allowed,
    /// Access is denied.
    Denied,
}

impl AuthzResult {
    /// Returns `true` if access is allowed.
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }
}

impl From<bool> for AuthzResult {
    fn from(allowed: bool) -> Self {
        if allowed { Self::Allowed } else { Self::Denied }
    }
}
