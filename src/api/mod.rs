//! HTTP surface for the drill engine.
//!
//! `api_router()` returns a composable `Router`; `server` binds it and
//! manages graceful shutdown.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::api_router;
pub use server::{serve, start_server_on, ApiServer, ServerSession};
pub use types::ApiContext;
