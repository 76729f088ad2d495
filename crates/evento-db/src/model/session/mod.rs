use diesel::{pg::Pg, prelude::*};

use crate::db::schema;

/// A login session. Only a hash of the cookie token is stored.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::session)]
#[diesel(check_for_backend(Pg))]
pub struct Session {
    pub id: uuid::Uuid,
    pub token_hash: String,
    pub user_id: uuid::Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

impl Session {
    #[must_use]
    pub fn is_expired_at(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = schema::session)]
pub struct NewSession {
    pub id: uuid::Uuid,
    pub token_hash: String,
    pub user_id: uuid::Uuid,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}
