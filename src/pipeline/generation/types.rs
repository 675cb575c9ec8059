use serde::Serialize;

use super::GenerationError;
use crate::db::DatabaseError;
use crate::models::{DrillDocument, QaReport};
use crate::pipeline::quality::FixDecision;

/// Text-in, text-out language model.
pub trait LlmClient {
    fn generate(&self, prompt: &str, system: &str) -> Result<String, GenerationError>;

    fn list_models(&self) -> Result<Vec<String>, GenerationError>;
}

/// Durable storage for finished drills. Returns the stored id.
pub trait DrillStore {
    fn save(&self, drill: &DrillDocument) -> Result<String, DatabaseError>;
}

/// Identifier handed back after a drill was persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveReceipt {
    pub saved: bool,
    pub id: String,
}

/// Everything one generation run produced.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub drill: DrillDocument,
    pub qa: QaReport,
    pub decision: FixDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved: Option<SaveReceipt>,
    /// Model calls made for fresh drills (regenerations included).
    pub attempts: u32,
    pub patched: bool,
}
