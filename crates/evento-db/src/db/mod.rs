//! Database access: the pool, schema, migrations, query builders and the
//! store implementations the services run against.

use futures::future::BoxFuture;

use crate::error::DbResult;

pub mod connection;
pub mod enums;
pub mod migrate;
pub mod query;
pub mod schema;
pub mod store;

pub use connection::{DbConnection, DbPool};

/// Hands out pooled connections to the PostgreSQL store.
pub trait DbProvider: Send + Sync {
    fn get_connection(&self) -> BoxFuture<'_, DbResult<DbConnection<'_>>>;
}
