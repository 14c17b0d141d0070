use std::sync::Arc;

use inkdrop_backend::{
    config::Config,
    configure_routes, db,
    store::{self, PgPostStore, SharedStore},
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inkdrop_backend=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;
    info!(
        "Using database {} on {}:{} as {}",
        config.database.name, config.database.host, config.database.port, config.database.user
    );

    let pool = db::get_connection_pool(&config.database);
    let store: SharedStore = Arc::new(PgPostStore::new(pool));
    if !store::initialize(store.as_ref()).await {
        warn!("Starting without a verified schema; requests may fail until the database is reachable");
    }

    let app = configure_routes(store);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!("InkDrop backend listening on http://{}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
