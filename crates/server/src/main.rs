use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use postwright_core::{
    create_llm_client, load_config, load_config_from_env, validate_config, Config, ConfigError,
    ContentGenerator, GoogleSearchClient, HttpMediaFetcher, PublishPipeline, SearchAggregator,
    XClient,
};
use postwright_server::{api::create_router, state::AppState};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Config file read when `POSTWRIGHT_CONFIG` is not set.
const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("postwright {}", VERSION);

    let config = read_config()?;
    validate_config(&config).context("Configuration validation failed")?;
    info!("Configuration loaded successfully");

    let search = build_search(&config);
    let generator = build_generator(&config);
    let pipeline = build_pipeline(&config);

    let state = Arc::new(
        AppState::new(config.clone())
            .with_search(search)
            .with_generator(generator)
            .with_pipeline(pipeline),
    );

    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

/// An explicit `POSTWRIGHT_CONFIG` must exist. Without it, `config.toml` is
/// used when present and the environment alone otherwise.
fn read_config() -> Result<Config> {
    if let Ok(path) = std::env::var("POSTWRIGHT_CONFIG") {
        let path = PathBuf::from(path);
        info!("Loading configuration from {:?}", path);
        return load_config(&path)
            .with_context(|| format!("Failed to load config from {:?}", path));
    }

    let path = PathBuf::from(DEFAULT_CONFIG_PATH);
    if path.exists() {
        info!("Loading configuration from {:?}", path);
        load_config(&path).with_context(|| format!("Failed to load config from {:?}", path))
    } else {
        info!("No config file found, using environment");
        load_config_from_env().context("Failed to load config from environment")
    }
}

fn build_search(config: &Config) -> Result<Arc<SearchAggregator>, ConfigError> {
    let client = GoogleSearchClient::new(config.search.clone())
        .inspect_err(|e| warn!("Search disabled: {}", e))?;
    info!(platform_site = %config.search.platform_site, "Search provider initialized");
    Ok(Arc::new(SearchAggregator::new(
        Arc::new(client),
        config.search.platform_site.clone(),
    )))
}

fn build_generator(config: &Config) -> Result<Arc<ContentGenerator>, ConfigError> {
    let llm = create_llm_client(&config.llm).inspect_err(|e| warn!("Generation disabled: {}", e))?;
    info!(provider = llm.provider(), model = llm.model(), "Completion provider initialized");
    Ok(Arc::new(
        ContentGenerator::new(llm)
            .with_max_tokens(config.llm.max_tokens)
            .with_temperature(config.llm.temperature),
    ))
}

fn build_pipeline(config: &Config) -> Result<Arc<PublishPipeline>, ConfigError> {
    let client = XClient::new(&config.publisher).inspect_err(|e| warn!("Publishing disabled: {}", e))?;
    info!("Posting provider initialized");
    Ok(Arc::new(PublishPipeline::new(
        Arc::new(client),
        Arc::new(HttpMediaFetcher::default()),
    )))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
