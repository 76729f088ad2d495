//! Subject types for authorization.
//!
//! Casbin policies grant permission tags to subjects. A user is checked as
//! itself and as each group it belongs to.

/// A subject for authorization checks.
///
/// In Casbin terms, this is the `sub` parameter in enforcement requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Subject {
    User(uuid::Uuid),
    Group(String),
}

impl Subject {
    /// Returns the Casbin subject string.
    #[must_use]
    pub fn casbin_subject(&self) -> String {
        match self {
            Self::User(id) => format!("user:{id}"),
            Self::Group(name) => format!("group:{name}"),
        }
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.casbin_subject())
    }
}

/// A user subject followed by the subjects of all its groups.
///
/// A permission is held if ANY of these subjects is granted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedSubjects {
    subjects: Vec<Subject>,
}

impl ExpandedSubjects {
    #[must_use]
    pub fn new(user_id: uuid::Uuid, groups: impl IntoIterator<Item = String>) -> Self {
        let mut subjects = vec![Subject::User(user_id)];
        subjects.extend(groups.into_iter().map(Subject::Group));
        Self { subjects }
    }

    /// Casbin subject strings, in expansion order.
    #[must_use]
    pub fn casbin_subjects(&self) -> Vec<String> {
        self.subjects.iter().map(Subject::casbin_subject).collect()
    }
}
