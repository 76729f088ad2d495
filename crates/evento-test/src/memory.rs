//! In-memory implementation of the store traits.
//!
//! Lets the HTTP tests run the full router without a database. Filtering goes
//! through [`EventQuery::matches`] and ordering follows the SQL listing:
//! `scheduled_at` descending, then id descending.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::{self, BoxFuture};
use uuid::Uuid;

use evento_db::db::store::{AccountStore, EventFields, EventPage, EventQuery, EventStore};
use evento_db::error::{DbError, DbResult};
use evento_db::model::event::{Event, EventWithAttendees};
use evento_db::model::session::{NewSession, Session};
use evento_db::model::user::{NewAccount, User};

#[derive(Default)]
struct State {
    users: BTreeMap<Uuid, User>,
    passwords: BTreeMap<Uuid, String>,
    memberships: BTreeMap<Uuid, BTreeSet<String>>,
    events: BTreeMap<Uuid, EventWithAttendees>,
    sessions: BTreeMap<String, Session>,
}

impl State {
    fn missing_users(&self, ids: &BTreeSet<Uuid>) -> Vec<Uuid> {
        ids.iter()
            .filter(|id| !self.users.contains_key(id))
            .copied()
            .collect()
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the state and recovers from poisoning.
    fn lock(&self) -> MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                self.state.clear_poison();
                poisoned.into_inner()
            }
        }
    }

    /// Number of live sessions, for logout assertions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.lock().sessions.len()
    }

    /// Marks a user inactive without touching their sessions.
    pub fn deactivate(&self, user_id: Uuid) {
        if let Some(user) = self.lock().users.get_mut(&user_id) {
            user.is_active = false;
        }
    }

    /// Moves every session of the user into the past.
    pub fn expire_sessions(&self, user_id: Uuid) {
        let past = Utc::now() - chrono::Duration::minutes(1);
        for session in self.lock().sessions.values_mut() {
            if session.user_id == user_id {
                session.expires_at = past;
            }
        }
    }
}

fn newest_first(a: &EventWithAttendees, b: &EventWithAttendees) -> std::cmp::Ordering {
    b.event
        .scheduled_at
        .cmp(&a.event.scheduled_at)
        .then_with(|| b.id().cmp(&a.id()))
}

impl EventStore for MemoryStore {
    fn find_by_id(&self, id: Uuid) -> BoxFuture<'_, DbResult<Option<EventWithAttendees>>> {
        let found = self.lock().events.get(&id).cloned();
        future::ready(Ok(found)).boxed()
    }

    fn list_all(&self) -> BoxFuture<'_, DbResult<Vec<EventWithAttendees>>> {
        let mut events = self.lock().events.values().cloned().collect::<Vec<_>>();
        events.sort_by(newest_first);
        future::ready(Ok(events)).boxed()
    }

    fn list_where<'a>(&'a self, query: &'a EventQuery) -> BoxFuture<'a, DbResult<EventPage>> {
        let mut events = self
            .lock()
            .events
            .values()
            .filter(|event| query.matches(event))
            .cloned()
            .collect::<Vec<_>>();
        events.sort_by(newest_first);

        let total = i64::try_from(events.len()).unwrap_or(i64::MAX);
        let offset = usize::try_from(query.offset).unwrap_or(0);
        let limit = query
            .limit
            .and_then(|limit| usize::try_from(limit).ok())
            .unwrap_or(usize::MAX);
        let events = events.into_iter().skip(offset).take(limit).collect();

        future::ready(Ok(EventPage { events, total })).boxed()
    }

    fn create<'a>(
        &'a self,
        fields: &'a EventFields,
        organizer_id: Uuid,
    ) -> BoxFuture<'a, DbResult<EventWithAttendees>> {
        let mut state = self.lock();
        let missing = state.missing_users(&fields.attendees);
        let result = if missing.is_empty() {
            let now = Utc::now();
            let new = fields.as_new_event(Uuid::now_v7(), organizer_id);
            let event = EventWithAttendees::new(
                Event {
                    id: new.id,
                    title: new.title.to_string(),
                    description: new.description.to_string(),
                    category: new.category,
                    scheduled_at: new.scheduled_at,
                    location: new.location.to_string(),
                    is_private: new.is_private,
                    organizer_id: new.organizer_id,
                    created_at: now,
                    updated_at: now,
                },
                fields.attendees.clone(),
            );
            state.events.insert(event.id(), event.clone());
            Ok(event)
        } else {
            Err(DbError::MissingUsers(missing))
        };
        future::ready(result).boxed()
    }

    fn update<'a>(
        &'a self,
        event: &'a EventWithAttendees,
        fields: &'a EventFields,
    ) -> BoxFuture<'a, DbResult<EventWithAttendees>> {
        let mut state = self.lock();
        let missing = state.missing_users(&fields.attendees);
        let result = if !missing.is_empty() {
            Err(DbError::MissingUsers(missing))
        } else if let Some(stored) = state.events.get_mut(&event.id()) {
            let changes = fields.as_changeset(Utc::now());
            stored.event.title = changes.title.to_string();
            stored.event.description = changes.description.to_string();
            stored.event.category = changes.category;
            stored.event.scheduled_at = changes.scheduled_at;
            stored.event.location = changes.location.to_string();
            stored.event.is_private = changes.is_private;
            stored.event.updated_at = changes.updated_at;
            stored.attendees.clone_from(&fields.attendees);
            Ok(stored.clone())
        } else {
            Err(DbError::DatabaseError(diesel::result::Error::NotFound))
        };
        future::ready(result).boxed()
    }

    fn delete<'a>(&'a self, event: &'a EventWithAttendees) -> BoxFuture<'a, DbResult<()>> {
        self.lock().events.remove(&event.id());
        future::ready(Ok(())).boxed()
    }

    fn missing_users<'a>(&'a self, ids: &'a BTreeSet<Uuid>) -> BoxFuture<'a, DbResult<Vec<Uuid>>> {
        let missing = self.lock().missing_users(ids);
        future::ready(Ok(missing)).boxed()
    }
}

impl AccountStore for MemoryStore {
    fn find_user_by_id(&self, id: Uuid) -> BoxFuture<'_, DbResult<Option<User>>> {
        let found = self.lock().users.get(&id).cloned();
        future::ready(Ok(found)).boxed()
    }

    fn find_user_by_username<'a>(
        &'a self,
        username: &'a str,
    ) -> BoxFuture<'a, DbResult<Option<User>>> {
        let found = self
            .lock()
            .users
            .values()
            .find(|user| user.username == username)
            .cloned();
        future::ready(Ok(found)).boxed()
    }

    fn password_hash(&self, user_id: Uuid) -> BoxFuture<'_, DbResult<Option<String>>> {
        let hash = self.lock().passwords.get(&user_id).cloned();
        future::ready(Ok(hash)).boxed()
    }

    fn create_user<'a>(
        &'a self,
        account: &'a NewAccount,
        password_hash: &'a str,
    ) -> BoxFuture<'a, DbResult<User>> {
        let mut state = self.lock();
        let taken = state
            .users
            .values()
            .any(|user| user.username == account.username);
        let result = if taken {
            Err(DbError::Conflict(format!("username {}", account.username)))
        } else {
            let now = Utc::now();
            let user = User {
                id: Uuid::now_v7(),
                username: account.username.clone(),
                email: account.email.clone(),
                first_name: account.first_name.clone(),
                last_name: account.last_name.clone(),
                is_superuser: account.is_superuser,
                is_staff: account.is_staff,
                is_active: true,
                created_at: now,
                updated_at: now,
            };
            state.passwords.insert(user.id, password_hash.to_string());
            state.users.insert(user.id, user.clone());
            Ok(user)
        };
        future::ready(result).boxed()
    }

    fn set_staff(&self, user_id: Uuid, is_staff: bool) -> BoxFuture<'_, DbResult<Option<User>>> {
        let updated = self.lock().users.get_mut(&user_id).map(|user| {
            user.is_staff = is_staff;
            user.updated_at = Utc::now();
            user.clone()
        });
        future::ready(Ok(updated)).boxed()
    }

    fn groups_for_user(&self, user_id: Uuid) -> BoxFuture<'_, DbResult<Vec<String>>> {
        let groups = self
            .lock()
            .memberships
            .get(&user_id)
            .map(|groups| groups.iter().cloned().collect())
            .unwrap_or_default();
        future::ready(Ok(groups)).boxed()
    }

    fn add_to_group<'a>(&'a self, user_id: Uuid, group: &'a str) -> BoxFuture<'a, DbResult<()>> {
        self.lock()
            .memberships
            .entry(user_id)
            .or_default()
            .insert(group.to_string());
        future::ready(Ok(())).boxed()
    }

    fn remove_from_group<'a>(
        &'a self,
        user_id: Uuid,
        group: &'a str,
    ) -> BoxFuture<'a, DbResult<bool>> {
        let removed = self
            .lock()
            .memberships
            .get_mut(&user_id)
            .is_some_and(|groups| groups.remove(group));
        future::ready(Ok(removed)).boxed()
    }

    fn create_session<'a>(&'a self, session: &'a NewSession) -> BoxFuture<'a, DbResult<()>> {
        self.lock().sessions.insert(
            session.token_hash.clone(),
            Session {
                id: session.id,
                token_hash: session.token_hash.clone(),
                user_id: session.user_id,
                created_at: Utc::now(),
                expires_at: session.expires_at,
            },
        );
        future::ready(Ok(())).boxed()
    }

    fn find_session<'a>(&'a self, token_hash: &'a str) -> BoxFuture<'a, DbResult<Option<Session>>> {
        let found = self.lock().sessions.get(token_hash).cloned();
        future::ready(Ok(found)).boxed()
    }

    fn delete_session<'a>(&'a self, token_hash: &'a str) -> BoxFuture<'a, DbResult<()>> {
        self.lock().sessions.remove(token_hash);
        future::ready(Ok(())).boxed()
    }

    fn delete_expired_sessions(&self, now: DateTime<Utc>) -> BoxFuture<'_, DbResult<usize>> {
        let mut state = self.lock();
        let before = state.sessions.len();
        state.sessions.retain(|_, session| !session.is_expired_at(now));
        future::ready(Ok(before - state.sessions.len())).boxed()
    }
}
