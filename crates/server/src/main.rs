use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use zesha_core::{
    load_config, load_config_from_env, validate_config, FfmpegExtractor, IngestService, Janitor,
    MetadataExtractor, ObjectStore, S3ObjectStore, ThetaClient, TranscodeClient,
};
use zesha_server::api::create_router;
use zesha_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

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

    // An explicit path must exist; the default one is optional.
    let config = match std::env::var("ZESHA_CONFIG") {
        Ok(path) => {
            let path = PathBuf::from(path);
            info!("Loading configuration from {:?}", path);
            load_config(&path).with_context(|| format!("Failed to load config from {:?}", path))?
        }
        Err(_) => {
            let path = PathBuf::from("config.toml");
            if path.exists() {
                info!("Loading configuration from {:?}", path);
                load_config(&path)
                    .with_context(|| format!("Failed to load config from {:?}", path))?
            } else {
                info!("No config.toml found, using defaults and environment");
                load_config_from_env().context("Failed to load config from environment")?
            }
        }
    };

    validate_config(&config).context("Configuration validation failed")?;

    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!(
        version = VERSION,
        config_hash = &config_hash[..16],
        bucket = %config.storage.bucket,
        endpoint = %config.storage.endpoint,
        "Configuration loaded successfully"
    );

    for dir in [&config.media.public_dir, &config.media.staging_dir] {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create directory {:?}", dir))?;
    }

    // Collaborators
    let store: Arc<dyn ObjectStore> = Arc::new(S3ObjectStore::new(&config.storage));
    info!("Using object store: {}", store.name());

    let extractor = FfmpegExtractor::new(config.extractor.clone());
    if let Err(e) = extractor.validate().await {
        warn!("Metadata extraction will fail until ffmpeg is available: {}", e);
    }
    let extractor: Arc<dyn MetadataExtractor> = Arc::new(extractor);

    let transcoder: Arc<dyn TranscodeClient> = Arc::new(
        ThetaClient::new(&config.transcoder).context("Failed to create transcoding client")?,
    );
    info!("Using transcoder: {} at {}", transcoder.name(), config.transcoder.base_url);

    let ingest = Arc::new(IngestService::new(
        store,
        extractor,
        transcoder,
        config.media.public_dir.clone(),
    ));

    let janitor = Janitor::for_media(config.janitor.clone(), &config.media);
    janitor.start();

    let state = Arc::new(AppState::new(config.clone(), ingest));
    let app = create_router(state);

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

    info!("Server shutting down...");
    janitor.stop();

    Ok(())
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
