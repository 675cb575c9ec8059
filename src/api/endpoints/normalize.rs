//! Runs the normalization engine on a caller-supplied drill.

use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::types::OkResponse;
use crate::models::{DrillDocument, GoalPolicy, QaReport};
use crate::pipeline::normalize::normalize_drill;
use crate::pipeline::quality::{assess, FixDecision, QaThresholds};

#[derive(Serialize)]
pub struct NormalizeBody {
    pub drill: DrillDocument,
    pub qa: QaReport,
    pub decision: FixDecision,
}

/// `POST /ai/normalize-drill` with `{ drill, goalsAvailable, gameModelId? }`.
pub async fn normalize(Json(body): Json<Value>) -> Result<Json<OkResponse<NormalizeBody>>, ApiError> {
    let policy = GoalPolicy::from_value(&body);
    let raw = body.get("drill").cloned().unwrap_or(Value::Null);
    let mut drill = DrillDocument::try_from(raw)?;

    normalize_drill(&mut drill, &policy);
    let (qa, decision) = assess(&drill, &QaThresholds::default());
    drill.qa = Some(qa.clone());

    Ok(Json(OkResponse::new(NormalizeBody {
        drill,
        qa,
        decision,
    })))
}
