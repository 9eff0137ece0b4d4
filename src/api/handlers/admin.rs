use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::api::response::{ApiError, JSend};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub torrents: u64,
    pub version: String,
}

pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<HealthResponse>>, ApiError> {
    let torrents = state.db.count_torrents()?;

    Ok(JSend::success(HealthResponse {
        status: "ok".to_string(),
        torrents,
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}
