use std::sync::Arc;

use evento_app::app::{AppState, build_router};
use evento_core::config::load_config;
use evento_db::db::connection::create_pool;
use evento_db::db::migrate::run_migrations;
use evento_db::db::store::PgStore;
use evento_service::account::ensure_bootstrap_admin;
use evento_service::auth::casbin::{init_casbin, seed_default_grants};
use evento_service::auth::session::sweep_expired_sessions;
use salvo::Listener;
use salvo::conn::TcpListener;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting Evento");

    let config = load_config()?;

    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        page_size = config.app.page_size,
        "Configuration loaded"
    );

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping debug");
    }

    run_migrations(&config.database.url).await?;

    let pool = create_pool(&config.database).await?;

    let mut enforcer = init_casbin(pool.clone()).await?;
    let seeded = seed_default_grants(&mut enforcer).await?;
    tracing::info!(seeded, "Default permission grants in place");

    let store = Arc::new(PgStore::new(pool));
    let swept = sweep_expired_sessions(store.as_ref()).await?;
    tracing::info!(swept, "Expired sessions removed");

    if let Some(admin) = &config.auth.bootstrap_admin {
        ensure_bootstrap_admin(store.as_ref(), admin).await?;
    }

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let acceptor = TcpListener::new(bind_addr.clone()).bind().await;

    let router = build_router(AppState {
        settings: Arc::new(config),
        events: store.clone(),
        accounts: store,
        enforcer: Arc::new(enforcer),
    });

    tracing::info!("Server listening on {bind_addr}");

    salvo::Server::new(acceptor).serve(router).await;

    Ok(())
}
