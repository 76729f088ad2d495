//! The bb8 pool of async PostgreSQL connections.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use evento_core::config::DatabaseConfig;
use futures::FutureExt;
use futures::future::BoxFuture;

use crate::db::DbProvider;
use crate::error::DbResult;

pub type DbPool = Pool<AsyncPgConnection>;
pub type DbConnection<'pool> = PooledConnection<'pool, AsyncPgConnection>;

/// How long a request waits for a free connection.
const CHECKOUT_TIMEOUT: Duration = Duration::from_secs(10);

/// Pool size for `database.max_connections`; bb8 rejects an empty pool.
#[must_use]
pub fn pool_size(max_connections: u8) -> u32 {
    u32::from(max_connections.max(1))
}

/// ## Summary
/// Opens the connection pool described by the database settings.
///
/// ## Errors
/// Returns an error if the first connection cannot be established.
#[tracing::instrument(skip_all, fields(max_connections = database.max_connections))]
pub async fn create_pool(database: &DatabaseConfig) -> anyhow::Result<DbPool> {
    let size = pool_size(database.max_connections);
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database.url.as_str());

    let pool = Pool::builder()
        .max_size(size)
        .min_idle(Some(1))
        .connection_timeout(CHECKOUT_TIMEOUT)
        .test_on_check_out(true)
        .build(manager)
        .await?;

    tracing::info!(pool_size = size, "Connection pool ready");
    Ok(pool)
}

impl DbProvider for DbPool {
    fn get_connection(&self) -> BoxFuture<'_, DbResult<DbConnection<'_>>> {
        async move { Ok(self.get().await?) }.boxed()
    }
}
