//! QOTD API Server
//!
//! Serves CRUD endpoints for quotes and comments on top of a storage backend
//! chosen at startup: volatile in-memory collections or an embedded SQLite
//! database.

mod config;
mod error;
mod handlers;
mod routes;
mod storage;

use anyhow::{Context, Result};
use clap::Parser;
use qotd_core::{Comment, Quote, Store};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use config::Config;
use storage::Storage;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub quotes: Arc<dyn Store<Quote>>,
    pub comments: Arc<dyn Store<Comment>>,
    pub environment: String,
    pub api_version: String,
    pub route_prefix: String,
}

impl AppState {
    pub fn new(
        storage: &Storage,
        environment: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        let api_version = api_version.into();
        Self {
            quotes: storage.quotes(),
            comments: storage.comments(),
            environment: environment.into(),
            route_prefix: config::route_prefix(&api_version),
            api_version,
        }
    }
}

#[tokio::main]
async fn main() {
    // Set up panic hook to log crashes
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()));
        let payload = if let Some(s) = info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        eprintln!("[PANIC] at {:?}: {}", location, payload);
        tracing::error!("PANIC at {:?}: {}", location, payload);
    }));

    let config = Config::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    let initialized = if config.log_json {
        tracing::subscriber::set_global_default(subscriber.json().finish())
    } else {
        tracing::subscriber::set_global_default(subscriber.finish())
    };
    if let Err(e) = initialized {
        eprintln!("[FATAL] Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Starting QOTD API Server v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_server(config).await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_server(config: Config) -> Result<()> {
    config.validate().context("Invalid configuration")?;
    info!(
        "Config loaded: port={}, environment={}, db_type={}",
        config.port, config.environment, config.storage.db_type
    );

    info!("Initializing storage...");
    let storage = Storage::connect(&config.storage)
        .await
        .context("Failed to initialize storage")?;
    info!("Storage initialized: {}", storage.backend());

    let state = AppState::new(&storage, &config.environment, &config.api_version);
    info!("Routes mounted under '{}'", config.route_prefix());
    let app = routes::router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Server listening on {} (env: {})", addr, config.environment);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Completing background tasks...");
    storage.disconnect().await;
    info!("Stopped server on {}", addr);

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Shutting down server (signal: SIGINT)"),
        _ = terminate => info!("Shutting down server (signal: SIGTERM)"),
    }
}
