mod config;
mod constants;
mod domain;
mod models;
mod routes;
mod services;
mod youtube;

use anyhow::Context;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::AppConfig;
use services::ingest::{IngestMonitor, IngestionLoop};
use services::query::QueryService;
use services::store::{PgVideoStore, VideoStore};
use youtube::{VideoSource, YoutubeClient};

pub struct AppState {
    query: QueryService,
    ingest: IngestMonitor,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_file_loaded = dotenvy::dotenv().is_ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if env_file_loaded {
        info!("loaded .env file");
    }

    let config = AppConfig::from_env().context("Invalid configuration")?;

    let pool = services::db::connect(&config.database_url, config.database_max_connections)
        .await
        .context("Failed to connect to database")?;

    let store: Arc<dyn VideoStore> = Arc::new(PgVideoStore::new(pool));
    let source: Arc<dyn VideoSource> = Arc::new(
        YoutubeClient::new(
            &config.youtube_api_key,
            &config.youtube_api_base_url,
            config.http_timeout,
        )
        .context("Failed to create YouTube client")?,
    );

    let ingestion = IngestionLoop::new(source, store.clone(), config.ingest.clone());
    let state = Arc::new(AppState {
        query: QueryService::new(store),
        ingest: ingestion.monitor(),
    });

    let shutdown = CancellationToken::new();
    let ingest_task = tokio::spawn(ingestion.run(shutdown.child_token()));
    tokio::spawn(cancel_on_signal(shutdown.clone()));

    let app = routes::build_routes()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .await
        .context("Server failed")?;

    // The server can also stop on its own; make sure ingestion follows
    shutdown.cancel();
    match ingest_task.await {
        Ok(Ok(report)) => info!(
            cycles = report.cycles,
            persisted = report.persisted,
            "[ingest] Stopped"
        ),
        Ok(Err(e)) => error!(error = %e, "[ingest] Had halted before shutdown"),
        Err(e) => error!(error = %e, "[ingest] Task panicked"),
    }

    Ok(())
}

/// Cancel `token` on Ctrl-C or SIGTERM
async fn cancel_on_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("Shutdown requested");
    token.cancel();
}
