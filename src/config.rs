use std::path::PathBuf;

use crate::pipeline::generation::{DEFAULT_FALLBACK_MODEL, DEFAULT_PRIMARY_MODEL};
use crate::pipeline_config::PipelineConfig;

/// Application-level constants
pub const APP_NAME: &str = "DrillGate";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Address the HTTP server binds to when none is configured.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:4000";

/// Default tracing filter; `RUST_LOG` overrides it.
pub fn default_log_filter() -> &'static str {
    "info,drillgate_lib=debug"
}

/// Application data directory: ~/CoachAI/
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("CoachAI")
}

/// Default SQLite database path.
pub fn default_database_path() -> PathBuf {
    app_data_dir().join("drills.db")
}

/// Runtime configuration. The only code that reads the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub gemini_api_key: Option<String>,
    pub primary_model: String,
    pub fallback_model: String,
    pub bind_addr: String,
    pub database_path: PathBuf,
    pub pipeline: PipelineConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            primary_model: DEFAULT_PRIMARY_MODEL.to_string(),
            fallback_model: DEFAULT_FALLBACK_MODEL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            database_path: default_database_path(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let flag = |key: &str| get(key).is_some_and(|v| v.trim() == "1");
        let defaults = Self::default();

        Self {
            gemini_api_key: get("GEMINI_API_KEY").or_else(|| get("GOOGLE_API_KEY")),
            primary_model: get("GEMINI_MODEL_PRIMARY").unwrap_or(defaults.primary_model),
            fallback_model: get("GEMINI_MODEL_FALLBACK").unwrap_or(defaults.fallback_model),
            bind_addr: get("DRILLGATE_BIND").unwrap_or(defaults.bind_addr),
            database_path: get("DRILLGATE_DB")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            pipeline: PipelineConfig {
                fast_mode: flag("FAST_E2E"),
                persist: flag("PERSIST_DRILLS"),
                ..defaults.pipeline
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn app_data_dir_ends_with_coachai() {
        assert!(app_data_dir().ends_with("CoachAI"));
        assert!(default_database_path().ends_with("drills.db"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.primary_model, "gemini-2.5-pro");
        assert_eq!(config.bind_addr, "127.0.0.1:4000");
    }

    #[test]
    fn environment_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("GOOGLE_API_KEY", "g-key"),
            ("GEMINI_MODEL_FALLBACK", "gemini-2.0-flash"),
            ("DRILLGATE_DB", "/tmp/x.db"),
            ("FAST_E2E", "1"),
            ("PERSIST_DRILLS", "true"),
        ]));
        assert_eq!(config.gemini_api_key.as_deref(), Some("g-key"));
        assert_eq!(config.fallback_model, "gemini-2.0-flash");
        assert_eq!(config.database_path, PathBuf::from("/tmp/x.db"));
        assert!(config.pipeline.fast_mode);
        // only "1" enables a flag
        assert!(!config.pipeline.persist);
    }

    #[test]
    fn gemini_key_wins_over_google_key() {
        let config = AppConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "primary"),
            ("GOOGLE_API_KEY", "secondary"),
        ]));
        assert_eq!(config.gemini_api_key.as_deref(), Some("primary"));
    }

    #[test]
    fn blank_values_are_unset() {
        let config = AppConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "  ")]));
        assert!(config.gemini_api_key.is_none());
    }
}
