//! `GET /health` endpoint handler.
//!
//! Returns a [`HealthResponse`] JSON payload containing the server
//! version, uptime, config source metadata, the loaded endpoint count,
//! and cumulative request statistics. The status is `degraded` while the
//! configuration is unusable; the endpoint still answers 200 so the
//! failure message can be read.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::engine::EngineState;
use crate::server::AppState;

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub config: ConfigHealth,
    pub stats: StatsResponse,
}

#[derive(Serialize, Deserialize)]
pub struct ConfigHealth {
    pub source: String,
    pub location: String,
    pub version: Option<String>,
    pub loaded_ago_seconds: u64,
    pub endpoints: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct StatsResponse {
    pub requests_matched: u64,
    pub requests_unmatched: u64,
    pub requests_failed: u64,
    pub config_loads: u64,
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let generation = state.store.generation().await;
    let source = state.store.source();

    let (status, endpoints, error) = match &*generation.state {
        EngineState::Ready(tree) => ("healthy", tree.total_endpoints(), None),
        EngineState::Failed(message) => ("degraded", 0, Some(message.clone())),
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        config: ConfigHealth {
            source: source.name().to_string(),
            location: source.location(),
            version: generation.version.as_ref().map(ToString::to_string),
            loaded_ago_seconds: generation.loaded_at.elapsed().as_secs(),
            endpoints,
            error,
        },
        stats: StatsResponse {
            requests_matched: state.stats.matched.load(Ordering::Relaxed),
            requests_unmatched: state.stats.unmatched.load(Ordering::Relaxed),
            requests_failed: state.stats.failed.load(Ordering::Relaxed),
            config_loads: state.store.load_count(),
        },
    })
}
