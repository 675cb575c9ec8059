//! Repository layer: entity-scoped database operations.

mod drill;

pub use drill::*;
