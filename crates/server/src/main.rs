use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ladder_core::config::{CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
use ladder_core::{
    create_gateway, load_config, load_config_from_env, validate_config, Config, FfmpegEncoder,
    FfprobeProber, Transcoder,
};
use ladder_server::api::create_router;
use ladder_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load .env before anything reads the environment
    let dotenv = dotenvy::dotenv();

    init_tracing();

    match dotenv {
        Ok(path) => info!("Loaded environment from {:?}", path),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("Error loading .env file: {}", e),
    }

    let config = load()?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Storage backend: {:?}", config.storage.backend);
    info!("Scratch directory: {:?}", config.transcoder.scratch_dir);

    let storage = create_gateway(&config.storage)
        .await
        .context("Failed to create storage gateway")?;
    info!("Using storage gateway: {}", storage.name());

    let prober = Arc::new(FfprobeProber::new(&config.encoder.ffprobe_path));
    let encoder = Arc::new(FfmpegEncoder::new(config.encoder.clone()));
    let transcoder = Arc::new(Transcoder::new(
        config.transcoder.clone(),
        storage,
        prober,
        encoder,
    ));

    let state = Arc::new(AppState::new(config.clone(), transcoder));
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

    info!("Server shut down");
    Ok(())
}

/// Logs go to stdout as text, or as JSON when `LADDER_LOG_FORMAT=json`.
fn init_tracing() {
    let json = std::env::var("LADDER_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();
}

/// Reads `LADDER_CONFIG` if set, else `config.toml` if present, else the
/// environment alone.
fn load() -> Result<Config> {
    match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) => load_from(&PathBuf::from(path)),
        Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            load_from(Path::new(DEFAULT_CONFIG_PATH))
        }
        Err(_) => {
            info!("No configuration file, using defaults and environment");
            load_config_from_env().context("Failed to load config from environment")
        }
    }
}

fn load_from(path: &Path) -> Result<Config> {
    info!("Loading configuration from {:?}", path);
    load_config(path).with_context(|| format!("Failed to load config from {:?}", path))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
