//! Drill generation and stored-drill endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, OkResponse};
use crate::db::{DrillPage, StoredDrill, DEFAULT_PAGE_SIZE};
use crate::models::DrillRequest;
use crate::pipeline::generation::GenerationOutcome;

/// `POST /ai/generate-drill`
pub async fn generate(
    State(ctx): State<ApiContext>,
    Json(request): Json<DrillRequest>,
) -> Result<Json<OkResponse<GenerationOutcome>>, ApiError> {
    let generator = ctx.generator.clone();
    let outcome = tokio::task::spawn_blocking(move || generator.generate(&request)).await??;
    Ok(Json(OkResponse::new(outcome)))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

/// `GET /drills?limit&cursor`
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(params): Query<ListParams>,
) -> Result<Json<OkResponse<DrillPage>>, ApiError> {
    let store = ctx.store.ok_or(ApiError::StorageUnavailable)?;
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    let page = tokio::task::spawn_blocking(move || {
        store.list(limit, params.cursor.as_deref())
    })
    .await??;
    Ok(Json(OkResponse::new(page)))
}

/// `GET /drills/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<OkResponse<StoredDrill>>, ApiError> {
    let store = ctx.store.ok_or(ApiError::StorageUnavailable)?;
    let drill = tokio::task::spawn_blocking(move || store.get(&id)).await??;
    Ok(Json(OkResponse::new(drill)))
}
