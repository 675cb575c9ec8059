//! HTTP router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Every response carries `Cache-Control: no-store`; CORS is permissive
//! for the local coaching UI.

use axum::http::header::{HeaderValue, CACHE_CONTROL};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Build the drill API router.
///
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub fn api_router(ctx: ApiContext) -> Router {
    Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/db/health", get(endpoints::health::database))
        .route("/ai/models", get(endpoints::models::list))
        .route("/ai/generate-drill", post(endpoints::drills::generate))
        .route("/ai/normalize-drill", post(endpoints::normalize::normalize))
        .route("/ai/fix-drill", post(endpoints::fixer::fix))
        .route("/drills", get(endpoints::drills::list))
        .route("/drills/:id", get(endpoints::drills::detail))
        .with_state(ctx)
        .layer(CorsLayer::permissive())
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
}
