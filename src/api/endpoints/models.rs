//! Model listing endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, OkResponse};

#[derive(Serialize)]
pub struct ModelsBody {
    pub models: Vec<String>,
}

/// `GET /ai/models`
pub async fn list(
    State(ctx): State<ApiContext>,
) -> Result<Json<OkResponse<ModelsBody>>, ApiError> {
    let generator = ctx.generator.clone();
    let models = tokio::task::spawn_blocking(move || generator.list_models()).await??;
    Ok(Json(OkResponse::new(ModelsBody { models })))
}
