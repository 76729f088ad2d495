use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A capability that can be granted to a user or a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PermissionTag {
    /// Administer every event regardless of ownership.
    #[serde(rename = "events.manage")]
    ManageEvents,
    /// Create events and edit the ones you organize.
    #[serde(rename = "events.organize")]
    OrganizeEvents,
}

impl PermissionTag {
    pub const ALL: [Self; 2] = [Self::ManageEvents, Self::OrganizeEvents];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ManageEvents => "events.manage",
            Self::OrganizeEvents => "events.organize",
        }
    }
}

impl std::fmt::Display for PermissionTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionTag {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| CoreError::InvalidInput(format!("unknown permission: {s}")))
    }
}
