//! Query builder functions for users, groups and sessions.

use diesel::pg::Pg;
use diesel::prelude::*;

use crate::db::schema::{auth_user, group, membership, session, user};
use crate::model::user::authuser::PASSWORD_AUTH_SOURCE;

#[must_use]
pub fn user_by_id(id: uuid::Uuid) -> user::BoxedQuery<'static, Pg> {
    user::table.filter(user::id.eq(id)).into_boxed()
}

#[must_use]
pub fn user_by_username(username: &str) -> user::BoxedQuery<'_, Pg> {
    user::table.filter(user::username.eq(username)).into_boxed()
}

/// ## Summary
/// Returns a query for the password credential of a user.
#[must_use]
pub fn password_credential(user_id: uuid::Uuid) -> auth_user::BoxedQuery<'static, Pg> {
    auth_user::table
        .filter(auth_user::user_id.eq(user_id))
        .filter(auth_user::auth_source.eq(PASSWORD_AUTH_SOURCE))
        .into_boxed()
}

#[must_use]
pub fn group_by_name(name: &str) -> group::BoxedQuery<'_, Pg> {
    group::table.filter(group::name.eq(name)).into_boxed()
}

/// ## Summary
/// Returns a query for the groups a user belongs to, ordered by name.
#[must_use]
pub fn groups_of_user(user_id: uuid::Uuid) -> group::BoxedQuery<'static, Pg> {
    group::table
        .filter(
            group::id.eq_any(
                membership::table
                    .filter(membership::user_id.eq(user_id))
                    .select(membership::group_id),
            ),
        )
        .order(group::name.asc())
        .into_boxed()
}

#[must_use]
pub fn session_by_token_hash(token_hash: &str) -> session::BoxedQuery<'_, Pg> {
    session::table
        .filter(session::token_hash.eq(token_hash))
        .into_boxed()
}

#[must_use]
pub fn sessions_expired_at(now: chrono::DateTime<chrono::Utc>) -> session::BoxedQuery<'static, Pg> {
    session::table
        .filter(session::expires_at.le(now))
        .into_boxed()
}
