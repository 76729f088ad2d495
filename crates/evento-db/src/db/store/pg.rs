use std::collections::{BTreeMap, BTreeSet};

use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use futures::FutureExt;
use futures::future::BoxFuture;

use super::{AccountStore, EventFields, EventPage, EventQuery, EventStore};
use crate::db::connection::{DbConnection, DbPool};
use crate::db::schema::{auth_user, event, event_attendee, group, membership, session, user};
use crate::db::{DbProvider, query};
use crate::error::{DbError, DbResult};
use crate::model::event::{Event, EventAttendee, EventWithAttendees};
use crate::model::group::{Group, NewGroup};
use crate::model::session::{NewSession, Session};
use crate::model::user::authuser::{AuthUser, NewAuthUser, PASSWORD_AUTH_SOURCE};
use crate::model::user::membership::NewMembership;
use crate::model::user::{NewAccount, User};

/// PostgreSQL implementation of the store traits.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> DbResult<DbConnection<'_>> {
        self.pool.get_connection().await
    }
}

/// Loads the attendee sets of `events` and pairs them up, keeping order.
async fn with_attendees(
    conn: &mut AsyncPgConnection,
    events: Vec<Event>,
) -> DbResult<Vec<EventWithAttendees>> {
    let ids = events.iter().map(|event| event.id).collect::<Vec<_>>();
    let rows = query::event::attendees_of(ids)
        .select(EventAttendee::as_select())
        .load::<EventAttendee>(conn)
        .await?;

    let mut attendees: BTreeMap<uuid::Uuid, BTreeSet<uuid::Uuid>> = BTreeMap::new();
    for row in rows {
        attendees.entry(row.event_id).or_default().insert(row.user_id);
    }

    Ok(events
        .into_iter()
        .map(|event| {
            let set = attendees.remove(&event.id).unwrap_or_default();
            EventWithAttendees::new(event, set)
        })
        .collect())
}

async fn missing_user_ids(
    conn: &mut AsyncPgConnection,
    ids: &BTreeSet<uuid::Uuid>,
) -> DbResult<Vec<uuid::Uuid>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let found = user::table
        .filter(user::id.eq_any(ids.iter().copied().collect::<Vec<_>>()))
        .select(user::id)
        .load::<uuid::Uuid>(conn)
        .await?
        .into_iter()
        .collect::<BTreeSet<_>>();

    Ok(ids.difference(&found).copied().collect())
}

async fn replace_attendees(
    conn: &mut AsyncPgConnection,
    event_id: uuid::Uuid,
    attendees: &BTreeSet<uuid::Uuid>,
) -> DbResult<()> {
    let missing = missing_user_ids(conn, attendees).await?;
    if !missing.is_empty() {
        return Err(DbError::MissingUsers(missing));
    }

    diesel::delete(event_attendee::table.filter(event_attendee::event_id.eq(event_id)))
        .execute(conn)
        .await?;

    let rows = attendees
        .iter()
        .map(|&user_id| EventAttendee { event_id, user_id })
        .collect::<Vec<_>>();
    if !rows.is_empty() {
        diesel::insert_into(event_attendee::table)
            .values(&rows)
            .execute(conn)
            .await?;
    }
    Ok(())
}

fn unique_violation_as_conflict(error: DieselError, what: &str) -> DbError {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            DbError::Conflict(what.to_string())
        }
        other => DbError::DatabaseError(other),
    }
}

impl EventStore for PgStore {
    #[tracing::instrument(skip(self))]
    fn find_by_id(&self, id: uuid::Uuid) -> BoxFuture<'_, DbResult<Option<EventWithAttendees>>> {
        async move {
            let mut conn = self.conn().await?;
            let Some(row) = query::event::by_id(id)
                .select(Event::as_select())
                .first::<Event>(&mut conn)
                .await
                .optional()?
            else {
                return Ok(None);
            };
            Ok(with_attendees(&mut conn, vec![row]).await?.pop())
        }
        .boxed()
    }

    #[tracing::instrument(skip(self))]
    fn list_all(&self) -> BoxFuture<'_, DbResult<Vec<EventWithAttendees>>> {
        async move {
            let mut conn = self.conn().await?;
            let rows = query::event::all()
                .order((event::scheduled_at.desc(), event::id.desc()))
                .select(Event::as_select())
                .load::<Event>(&mut conn)
                .await?;
            with_attendees(&mut conn, rows).await
        }
        .boxed()
    }

    #[tracing::instrument(skip(self))]
    fn list_where<'a>(&'a self, query: &'a EventQuery) -> BoxFuture<'a, DbResult<EventPage>> {
        async move {
            let mut conn = self.conn().await?;
            let total = query::event::filtered(query)
                .count()
                .get_result::<i64>(&mut conn)
                .await?;
            let rows = query::event::listing(query)
                .select(Event::as_select())
                .load::<Event>(&mut conn)
                .await?;
            let events = with_attendees(&mut conn, rows).await?;

            tracing::debug!(total, returned = events.len(), "Listed events");
            Ok(EventPage { events, total })
        }
        .boxed()
    }

    #[tracing::instrument(skip(self, fields), fields(title = %fields.title))]
    fn create<'a>(
        &'a self,
        fields: &'a EventFields,
        organizer_id: uuid::Uuid,
    ) -> BoxFuture<'a, DbResult<EventWithAttendees>> {
        async move {
            let mut conn = self.conn().await?;
            let id = uuid::Uuid::now_v7();

            let row = conn
                .transaction::<_, DbError, _>(|conn| {
                    async move {
                        let row = diesel::insert_into(event::table)
                            .values(fields.as_new_event(id, organizer_id))
                            .returning(Event::as_returning())
                            .get_result::<Event>(conn)
                            .await?;
                        replace_attendees(conn, row.id, &fields.attendees).await?;
                        Ok(row)
                    }
                    .scope_boxed()
                })
                .await?;

            tracing::info!(event_id = %row.id, "Event created");
            Ok(EventWithAttendees::new(row, fields.attendees.clone()))
        }
        .boxed()
    }

    #[tracing::instrument(skip(self, event, fields), fields(event_id = %event.id()))]
    fn update<'a>(
        &'a self,
        event: &'a EventWithAttendees,
        fields: &'a EventFields,
    ) -> BoxFuture<'a, DbResult<EventWithAttendees>> {
        async move {
            let mut conn = self.conn().await?;
            let id = event.id();

            let row = conn
                .transaction::<_, DbError, _>(|conn| {
                    async move {
                        let row = diesel::update(event::table.filter(event::id.eq(id)))
                            .set(fields.as_changeset(chrono::Utc::now()))
                            .returning(Event::as_returning())
                            .get_result::<Event>(conn)
                            .await?;
                        replace_attendees(conn, id, &fields.attendees).await?;
                        Ok(row)
                    }
                    .scope_boxed()
                })
                .await?;

            tracing::info!("Event updated");
            Ok(EventWithAttendees::new(row, fields.attendees.clone()))
        }
        .boxed()
    }

    #[tracing::instrument(skip(self, event), fields(event_id = %event.id()))]
    fn delete<'a>(&'a self, event: &'a EventWithAttendees) -> BoxFuture<'a, DbResult<()>> {
        async move {
            let mut conn = self.conn().await?;
            // Attendee rows go with the event via ON DELETE CASCADE.
            diesel::delete(event::table.filter(event::id.eq(event.id())))
                .execute(&mut conn)
                .await?;
            tracing::info!("Event deleted");
            Ok(())
        }
        .boxed()
    }

    fn missing_users<'a>(
        &'a self,
        ids: &'a BTreeSet<uuid::Uuid>,
    ) -> BoxFuture<'a, DbResult<Vec<uuid::Uuid>>> {
        async move {
            let mut conn = self.conn().await?;
            missing_user_ids(&mut conn, ids).await
        }
        .boxed()
    }
}

impl AccountStore for PgStore {
    fn find_user_by_id(&self, id: uuid::Uuid) -> BoxFuture<'_, DbResult<Option<User>>> {
        async move {
            let mut conn = self.conn().await?;
            Ok(query::account::user_by_id(id)
                .select(User::as_select())
                .first::<User>(&mut conn)
                .await
                .optional()?)
        }
        .boxed()
    }

    fn find_user_by_username<'a>(
        &'a self,
        username: &'a str,
    ) -> BoxFuture<'a, DbResult<Option<User>>> {
        async move {
            let mut conn = self.conn().await?;
            Ok(query::account::user_by_username(username)
                .select(User::as_select())
                .first::<User>(&mut conn)
                .await
                .optional()?)
        }
        .boxed()
    }

    fn password_hash(&self, user_id: uuid::Uuid) -> BoxFuture<'_, DbResult<Option<String>>> {
        async move {
            let mut conn = self.conn().await?;
            let credential = query::account::password_credential(user_id)
                .select(AuthUser::as_select())
                .first::<AuthUser>(&mut conn)
                .await
                .optional()?;
            Ok(credential.map(|credential| credential.auth_id))
        }
        .boxed()
    }

    #[tracing::instrument(skip(self, account, password_hash), fields(username = %account.username))]
    fn create_user<'a>(
        &'a self,
        account: &'a NewAccount,
        password_hash: &'a str,
    ) -> BoxFuture<'a, DbResult<User>> {
        async move {
            let mut conn = self.conn().await?;
            let id = uuid::Uuid::now_v7();

            let created = conn
                .transaction::<_, DbError, _>(|conn| {
                    async move {
                        let created = diesel::insert_into(user::table)
                            .values(account.as_insertable(id))
                            .returning(User::as_returning())
                            .get_result::<User>(conn)
                            .await
                            .map_err(|e| unique_violation_as_conflict(e, "username"))?;
                        diesel::insert_into(auth_user::table)
                            .values(NewAuthUser {
                                user_id: created.id,
                                auth_source: PASSWORD_AUTH_SOURCE,
                                auth_id: password_hash,
                            })
                            .execute(conn)
                            .await?;
                        Ok(created)
                    }
                    .scope_boxed()
                })
                .await?;

            tracing::info!(user_id = %created.id, "User created");
            Ok(created)
        }
        .boxed()
    }

    #[tracing::instrument(skip(self))]
    fn set_staff(
        &self,
        user_id: uuid::Uuid,
        is_staff: bool,
    ) -> BoxFuture<'_, DbResult<Option<User>>> {
        async move {
            let mut conn = self.conn().await?;
            Ok(diesel::update(user::table.filter(user::id.eq(user_id)))
                .set((
                    user::is_staff.eq(is_staff),
                    user::updated_at.eq(chrono::Utc::now()),
                ))
                .returning(User::as_returning())
                .get_result::<User>(&mut conn)
                .await
                .optional()?)
        }
        .boxed()
    }

    fn groups_for_user(&self, user_id: uuid::Uuid) -> BoxFuture<'_, DbResult<Vec<String>>> {
        async move {
            let mut conn = self.conn().await?;
            Ok(query::account::groups_of_user(user_id)
                .select(group::name)
                .load::<String>(&mut conn)
                .await?)
        }
        .boxed()
    }

    #[tracing::instrument(skip(self))]
    fn add_to_group<'a>(
        &'a self,
        user_id: uuid::Uuid,
        group_name: &'a str,
    ) -> BoxFuture<'a, DbResult<()>> {
        async move {
            let mut conn = self.conn().await?;

            diesel::insert_into(group::table)
                .values(NewGroup { name: group_name })
                .on_conflict(group::name)
                .do_nothing()
                .execute(&mut conn)
                .await?;
            let found = query::account::group_by_name(group_name)
                .select(Group::as_select())
                .first::<Group>(&mut conn)
                .await?;

            diesel::insert_into(membership::table)
                .values(NewMembership {
                    user_id,
                    group_id: found.id,
                })
                .on_conflict_do_nothing()
                .execute(&mut conn)
                .await?;
            Ok(())
        }
        .boxed()
    }

    #[tracing::instrument(skip(self))]
    fn remove_from_group<'a>(
        &'a self,
        user_id: uuid::Uuid,
        group_name: &'a str,
    ) -> BoxFuture<'a, DbResult<bool>> {
        async move {
            let mut conn = self.conn().await?;
            let Some(found) = query::account::group_by_name(group_name)
                .select(Group::as_select())
                .first::<Group>(&mut conn)
                .await
                .optional()?
            else {
                return Ok(false);
            };

            let removed = diesel::delete(
                membership::table
                    .filter(membership::user_id.eq(user_id))
                    .filter(membership::group_id.eq(found.id)),
            )
            .execute(&mut conn)
            .await?;
            Ok(removed > 0)
        }
        .boxed()
    }

    fn create_session<'a>(&'a self, new_session: &'a NewSession) -> BoxFuture<'a, DbResult<()>> {
        async move {
            let mut conn = self.conn().await?;
            diesel::insert_into(session::table)
                .values(new_session)
                .execute(&mut conn)
                .await?;
            Ok(())
        }
        .boxed()
    }

    fn find_session<'a>(&'a self, token_hash: &'a str) -> BoxFuture<'a, DbResult<Option<Session>>> {
        async move {
            let mut conn = self.conn().await?;
            Ok(query::account::session_by_token_hash(token_hash)
                .select(Session::as_select())
                .first::<Session>(&mut conn)
                .await
                .optional()?)
        }
        .boxed()
    }

    fn delete_session<'a>(&'a self, token_hash: &'a str) -> BoxFuture<'a, DbResult<()>> {
        async move {
            let mut conn = self.conn().await?;
            diesel::delete(session::table.filter(session::token_hash.eq(token_hash)))
                .execute(&mut conn)
                .await?;
            Ok(())
        }
        .boxed()
    }

    #[tracing::instrument(skip(self))]
    fn delete_expired_sessions(
        &self,
        now: chrono::DateTime<chrono::Utc>,
    ) -> BoxFuture<'_, DbResult<usize>> {
        async move {
            let mut conn = self.conn().await?;
            let expired = query::account::sessions_expired_at(now).select(session::id);
            let removed = diesel::delete(session::table.filter(session::id.eq_any(expired)))
                .execute(&mut conn)
                .await?;
            tracing::debug!(removed, "Swept expired sessions");
            Ok(removed)
        }
        .boxed()
    }
}
