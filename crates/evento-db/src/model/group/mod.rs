use diesel::{pg::Pg, prelude::*};

use crate::db::schema;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::group)]
#[diesel(check_for_backend(Pg))]
pub struct Group {
    pub id: uuid::Uuid,
    pub name: String,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = schema::group)]
pub struct NewGroup<'a> {
    pub name: &'a str,
}
