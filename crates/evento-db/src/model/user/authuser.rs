use diesel::{pg::Pg, prelude::*};

use crate::{db::schema, model};

/// Source tag of Argon2 password credentials.
pub const PASSWORD_AUTH_SOURCE: &str = "password";

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = schema::auth_user)]
#[diesel(check_for_backend(Pg))]
#[diesel(belongs_to(model::user::User, foreign_key = user_id))]
pub struct AuthUser {
    pub id: uuid::Uuid,
    pub user_id: uuid::Uuid,
    pub auth_source: String,
    /// For the password source this holds the PHC-encoded Argon2 hash.
    pub auth_id: String,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::auth_user)]
pub struct NewAuthUser<'a> {
    pub user_id: uuid::Uuid,
    pub auth_source: &'a str,
    pub auth_id: &'a str,
}
