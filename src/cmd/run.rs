//! `stubtree run`: start the stub server.
//!
//! Resolves the config file, builds the [`ConfigStore`], loads the first
//! generation eagerly so problems show up in the startup log, then
//! serves requests with graceful shutdown. A background loop polls the
//! source for changes and reloads when its content hash moves.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::cli::RunArgs;
use crate::config::sources::{self, extension_of};
use crate::config::store::ConfigStore;
use crate::config::ConfigSource;
use crate::error::StubError;
use crate::logging;
use crate::server::{self, AppState};

/// Files looked for in the working directory when `--config` is not given.
pub const AUTO_DETECT_CANDIDATES: [&str; 3] = ["stubtree.json", "stubtree.yaml", "stubtree.yml"];

pub async fn execute(args: RunArgs) -> Result<(), StubError> {
    logging::init(&args.log_level, logging::resolve_format(args.pretty, args.json));

    let source = resolve_file_source(args.config.as_deref()).await?;
    let state = Arc::new(AppState::new(ConfigStore::new(source)));

    let initial = state.store.state().await;
    if let Some(message) = initial.error_message() {
        tracing::warn!(error = %message, "starting with an unusable configuration");
    }
    let endpoint_count = initial.tree().map_or(0, |t| t.total_endpoints());

    // Shutdown signal: dropping shutdown_tx closes the channel and stops the refresh loop
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let refresh_handle = (args.poll_interval > 0).then(|| {
        let refresh_state = Arc::clone(&state);
        let poll_interval = args.poll_interval;
        tokio::spawn(async move {
            config_refresh_loop(refresh_state, poll_interval, shutdown_rx).await;
        })
    });

    let router = server::build_router(Arc::clone(&state), args.max_body);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        config = %state.store.source().location(),
        endpoints = endpoint_count,
        poll_interval_secs = args.poll_interval,
        "stubtree started"
    );

    // Wrap the shutdown signal to also stop the config refresh loop immediately
    let graceful_shutdown = async move {
        server::shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    };

    axum::serve(listener, router)
        .with_graceful_shutdown(graceful_shutdown)
        .await?;

    // Wait for the config refresh task to finish (catches panics)
    if let Some(handle) = refresh_handle {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "config refresh task failed");
        }
    }

    tracing::info!("stubtree stopped");
    Ok(())
}

async fn resolve_file_source(explicit: Option<&Path>) -> Result<Box<dyn ConfigSource>, StubError> {
    if let Some(path) = explicit {
        return create_file_source(path);
    }

    for name in AUTO_DETECT_CANDIDATES {
        let path = PathBuf::from(name);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::info!(path = %path.display(), "auto-detected config file");
            return create_file_source(&path);
        }
    }

    Err(StubError::NoConfigSource {
        hint: "Provide --config <file> or create ./stubtree.json.\n  \
               Run 'stubtree init' to create a config file."
            .into(),
    })
}

pub fn create_file_source(path: &Path) -> Result<Box<dyn ConfigSource>, StubError> {
    match extension_of(path).as_str() {
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => Ok(Box::new(sources::yaml::new(path.to_path_buf()))),

        "json" => Ok(Box::new(sources::json::new(path.to_path_buf()))),

        other => Err(StubError::UnsupportedFormat(other.to_string())),
    }
}

async fn config_refresh_loop(
    state: Arc<AppState>,
    interval_secs: u64,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    interval.tick().await; // Skip first immediate tick

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = shutdown.changed() => {
                tracing::debug!("config refresh loop shutting down");
                return;
            }
        }

        match state.store.refresh_if_changed().await {
            Ok(true) => tracing::info!("config change detected, reloaded"),
            Ok(false) => {}
            Err(e) => tracing::warn!(error = %e, "config change check failed"),
        }
    }
}
