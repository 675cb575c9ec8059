//! Health check endpoints.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::DbHealth;
use crate::pipeline_config::PipelineConfig;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub ok: bool,
    pub name: &'static str,
    pub version: &'static str,
    pub pipeline: PipelineConfig,
}

/// `GET /health`
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        name: crate::config::APP_NAME,
        version: crate::config::APP_VERSION,
        pipeline: ctx.generator.config().clone(),
    })
}

/// `GET /db/health`. `DbHealth` carries its own `ok` flag.
pub async fn database(
    State(ctx): State<ApiContext>,
) -> Result<Json<DbHealth>, ApiError> {
    let store = ctx.store.ok_or(ApiError::StorageUnavailable)?;
    let health = tokio::task::spawn_blocking(move || store.health()).await??;
    Ok(Json(health))
}
