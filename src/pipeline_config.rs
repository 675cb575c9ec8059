//! Orchestrator settings.
//!
//! Built once from `AppConfig` and handed to `DrillGenerator` at
//! construction. Nothing in the normalization or scoring code reads these.
//! `GET /health` reports them.

use serde::Serialize;

/// Regenerations allowed after a `NEEDS_REGEN` decision.
pub const DEFAULT_MAX_REGEN_ATTEMPTS: u32 = 1;

/// Per-request timeout for model calls, in seconds.
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    /// Return a deterministic stub drill instead of calling the model.
    pub fast_mode: bool,
    /// Save finished drills through the configured store.
    pub persist: bool,
    pub max_regen_attempts: u32,
    /// Run one fixer round on `PATCHABLE` drills.
    pub auto_patch: bool,
    pub llm_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fast_mode: false,
            persist: false,
            max_regen_attempts: DEFAULT_MAX_REGEN_ATTEMPTS,
            auto_patch: true,
            llm_timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = PipelineConfig::default();
        assert!(!config.fast_mode);
        assert!(!config.persist);
        assert_eq!(config.max_regen_attempts, 1);
        assert!(config.auto_patch);
        assert_eq!(config.llm_timeout_secs, 120);
    }

    #[test]
    fn serializes_for_health_report() {
        let value = serde_json::to_value(PipelineConfig::default()).unwrap();
        assert_eq!(value["fastMode"], false);
        assert_eq!(value["maxRegenAttempts"], 1);
        assert_eq!(value["llmTimeoutSecs"], 120);
    }
}
