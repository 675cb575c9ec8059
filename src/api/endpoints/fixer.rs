//! Fix planning for an already-scored drill.

use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::types::OkResponse;
use crate::models::QaReport;
use crate::pipeline::quality::{fix_drill, FixReport};

#[derive(Serialize)]
pub struct FixBody {
    pub drill: Value,
    pub qa: Value,
    #[serde(flatten)]
    pub report: FixReport,
}

/// `POST /ai/fix-drill` with `{ original, qa }`. The drill comes back
/// unchanged alongside the decision and planned actions.
pub async fn fix(Json(body): Json<Value>) -> Result<Json<OkResponse<FixBody>>, ApiError> {
    let qa = body.get("qa").cloned().unwrap_or(Value::Null);
    let drill = body.get("original").cloned().unwrap_or(Value::Null);
    let scores = QaReport::from_value(&qa).scores;
    let report = fix_drill(&scores);

    tracing::info!(decision = %report.decision.code, "Fix decision computed");

    Ok(Json(OkResponse::new(FixBody { drill, qa, report })))
}
