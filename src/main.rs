use catalog_search_sync::{
    api::{build_router, AppState},
    config::Config,
    search::{IndexManager, OpenSearchClient},
    state::create_store,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "catalog_search_sync={level},tower_http={level}",
            level = config.observability.log_level
        )
        .into()
    });
    let registry = tracing_subscriber::registry().with(filter);
    if config.observability.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    if let Some(e) = config_error {
        tracing::warn!(error = %e, "Failed to load configuration, using defaults");
    }

    tracing::info!(
        service = %config.observability.service_name,
        "Starting catalog search sync v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Initialize catalog store
    tracing::info!("Storage backend: {:?}", config.state.backend);
    let store = create_store(&config.state).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to initialize catalog store");
        e
    })?;
    tracing::info!("Catalog store initialized");

    // Initialize search engine client
    let engine = Arc::new(OpenSearchClient::new(&config.search)?);
    tracing::info!(nodes = ?config.search.nodes(), index = %config.search.index_name, "Search client configured");

    let indices = IndexManager::new(engine, config.search.index_name.clone());

    // Search endpoints fail until the engine is up; the server starts regardless
    match indices
        .wait_for_engine(config.search.ping_retries, config.search.ping_delay())
        .await
    {
        Ok(_) => match indices.ensure_index().await {
            Ok(()) => tracing::info!(index = %indices.index_name(), "Search index ready"),
            Err(e) => tracing::error!(error = %e, "Failed to ensure search index"),
        },
        Err(e) => tracing::error!(
            error = %e,
            attempts = config.search.ping_retries,
            "Search engine unreachable at startup; continuing without it"
        ),
    }

    let app = build_router(AppState::new(store, indices)).layer(TimeoutLayer::new(
        Duration::from_secs(config.server.request_timeout_secs),
    ));

    // Start HTTP server
    let http_addr = format!("{}:{}", config.server.host, config.server.port);
    let http_listener = tokio::net::TcpListener::bind(&http_addr).await?;

    tracing::info!("HTTP API server listening on http://{}", http_addr);
    tracing::info!("   Health check: http://{}/api/health", http_addr);
    tracing::info!("   Products: http://{}/api/products", http_addr);
    tracing::info!("   Search: http://{}/api/search/products", http_addr);

    axum::serve(http_listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
