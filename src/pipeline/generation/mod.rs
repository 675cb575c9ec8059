pub mod gemini;
pub mod orchestrator;
pub mod parser;
pub mod prompt;
pub mod types;

pub use gemini::*;
pub use orchestrator::*;
pub use parser::*;
pub use prompt::*;
pub use types::*;

use thiserror::Error;

use crate::db::DatabaseError;
use crate::pipeline::normalize::NormalizeError;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("GEMINI_API_KEY missing")]
    MissingApiKey,

    #[error("Cannot reach model API at {0}")]
    Connection(String),

    #[error("Model API returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("LLM returned non-JSON drill")]
    NonJsonDrill,

    #[error(transparent)]
    Shape(#[from] NormalizeError),

    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),
}
