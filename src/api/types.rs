//! Shared types for the HTTP layer.

use std::sync::Arc;

use serde::Serialize;

use crate::db::SqliteDrillStore;
use crate::pipeline::generation::DrillGenerator;

/// Shared context for all routes.
#[derive(Clone)]
pub struct ApiContext {
    pub generator: Arc<DrillGenerator>,
    /// `None` when the server runs without a database.
    pub store: Option<Arc<SqliteDrillStore>>,
}

impl ApiContext {
    pub fn new(generator: Arc<DrillGenerator>, store: Option<Arc<SqliteDrillStore>>) -> Self {
        Self { generator, store }
    }
}

/// Success envelope: `{ "ok": true, ...body }`.
#[derive(Debug, Serialize)]
pub struct OkResponse<T: Serialize> {
    pub ok: bool,
    #[serde(flatten)]
    pub body: T,
}

impl<T: Serialize> OkResponse<T> {
    pub fn new(body: T) -> Self {
        Self { ok: true, body }
    }
}
