pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod pipeline;
pub mod pipeline_config;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::api::ApiContext;
use crate::config::AppConfig;
use crate::db::{DatabaseError, SqliteDrillStore};
use crate::pipeline::generation::{DrillGenerator, GeminiClient, GenerationError};

/// Errors that stop the server before it starts listening.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Invalid bind address {addr}: {reason}")]
    InvalidBindAddr { addr: String, reason: String },
    #[error("LLM client setup failed: {0}")]
    Llm(#[from] GenerationError),
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build the shared request context from configuration.
///
/// The database is optional: if it cannot be opened the server still
/// runs and storage endpoints answer `DB_UNAVAILABLE`.
pub fn build_context(config: &AppConfig) -> Result<ApiContext, StartupError> {
    if config.gemini_api_key.is_none() && !config.pipeline.fast_mode {
        tracing::warn!("GEMINI_API_KEY not set; drill generation will fail");
    }

    let llm = GeminiClient::new(
        config.gemini_api_key.as_deref().unwrap_or_default(),
        &config.primary_model,
        &config.fallback_model,
        config.pipeline.llm_timeout_secs,
    )?;

    let store = match open_store(config) {
        Ok(store) => Some(Arc::new(store)),
        Err(e) => {
            tracing::warn!(
                path = %config.database_path.display(),
                error = %e,
                "Drill database unavailable; running without storage"
            );
            None
        }
    };

    let mut generator = DrillGenerator::new(Box::new(llm), config.pipeline.clone());
    if let Some(store) = &store {
        generator = generator.with_store(store.clone());
    }

    Ok(ApiContext::new(Arc::new(generator), store))
}

fn open_store(config: &AppConfig) -> Result<SqliteDrillStore, DatabaseError> {
    SqliteDrillStore::open(&config.database_path)
}

fn parse_bind_addr(addr: &str) -> Result<SocketAddr, StartupError> {
    addr.parse().map_err(|e: std::net::AddrParseError| StartupError::InvalidBindAddr {
        addr: addr.to_string(),
        reason: e.to_string(),
    })
}

pub fn run() -> Result<(), StartupError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = AppConfig::from_env();
    let addr = parse_bind_addr(&config.bind_addr)?;

    tracing::info!(
        fast_mode = config.pipeline.fast_mode,
        persist = config.pipeline.persist,
        primary = %config.primary_model,
        fallback = %config.fallback_model,
        "Configuration loaded"
    );

    // The blocking HTTP client must be created outside the async runtime.
    let ctx = build_context(&config)?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(api::serve(ctx, addr))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn bind_addr_parses() {
        assert_eq!(parse_bind_addr("127.0.0.1:4000").unwrap().port(), 4000);
    }

    #[test]
    fn bad_bind_addr_is_reported() {
        let err = parse_bind_addr("localhost").unwrap_err();
        assert!(matches!(err, StartupError::InvalidBindAddr { ref addr, .. } if addr == "localhost"));
    }

    #[test]
    fn context_opens_store_at_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            database_path: dir.path().join("nested").join("drills.db"),
            ..AppConfig::default()
        };
        let ctx = build_context(&config).unwrap();
        assert!(ctx.store.is_some());
        assert!(config.database_path.exists());
    }

    #[test]
    fn unusable_database_path_runs_without_store() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened as a database file.
        let config = AppConfig {
            database_path: PathBuf::from(dir.path()),
            ..AppConfig::default()
        };
        let ctx = build_context(&config).unwrap();
        assert!(ctx.store.is_none());
    }
}
