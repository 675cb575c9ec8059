use serde_json::Value;

use super::GenerationError;

/// Parse the model's reply into raw drill JSON.
///
/// Strips a surrounding ```json / ``` fence first. If the remainder still
/// isn't JSON, the text between the first `{` and the last `}` is tried.
pub fn parse_drill_response(text: &str) -> Result<Value, GenerationError> {
    let cleaned = strip_code_fence(text);
    if let Ok(value) = serde_json::from_str::<Value>(cleaned) {
        return Ok(value);
    }

    let start = cleaned.find('{').ok_or(GenerationError::NonJsonDrill)?;
    let end = cleaned.rfind('}').ok_or(GenerationError::NonJsonDrill)?;
    if end <= start {
        return Err(GenerationError::NonJsonDrill);
    }
    serde_json::from_str(&cleaned[start..=end]).map_err(|e| {
        tracing::debug!(error = %e, "Drill JSON salvage failed");
        GenerationError::NonJsonDrill
    })
}

fn strip_code_fence(text: &str) -> &str {
    let mut s = text.trim();
    if let Some(rest) = s
        .strip_prefix("```json")
        .or_else(|| s.strip_prefix("```JSON"))
        .or_else(|| s.strip_prefix("```"))
    {
        s = rest;
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest;
    }
    s.trim()
}
