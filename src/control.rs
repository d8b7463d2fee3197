//! `POST /_control/reload` handler.
//!
//! Forces the [`ConfigStore`](crate::config::store::ConfigStore) to build
//! a new generation and reports whether it is usable.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::engine::EngineState;
use crate::server::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct ReloadResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn reload_handler(State(state): State<Arc<AppState>>) -> (StatusCode, Json<ReloadResponse>) {
    tracing::info!("reload requested");
    let engine = state.store.reload().await;

    match &*engine {
        EngineState::Ready(tree) => (
            StatusCode::OK,
            Json(ReloadResponse {
                status: "ready".to_string(),
                endpoints: Some(tree.total_endpoints()),
                error: None,
            }),
        ),
        EngineState::Failed(message) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ReloadResponse {
                status: "failed".to_string(),
                endpoints: None,
                error: Some(message.clone()),
            }),
        ),
    }
}
