use super::AccessTarget;

/// The subset of events a listing query may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryScope {
    /// Every event.
    All,
    /// Public events plus the ones the principal organizes or attends.
    MineAndPublic,
    /// Only the events the principal organizes.
    Organized,
    /// No events at all.
    Nothing,
}

impl QueryScope {
    /// ## Summary
    /// Returns `true` if an event belongs to this scope for the given principal.
    ///
    /// Stores that cannot push the scope down into a query filter with this.
    #[must_use]
    pub fn admits<T: AccessTarget + ?Sized>(self, principal_id: uuid::Uuid, event: &T) -> bool {
        match self {
            Self::All => true,
            Self::MineAndPublic => {
                !event.is_private()
                    || event.organizer_id() == principal_id
                    || event.has_attendee(principal_id)
            }
            Self::Organized => event.organizer_id() == principal_id,
            Self::Nothing => false,
        }
    }
}
