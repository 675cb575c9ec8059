//! API endpoint handlers.
//!
//! Blocking work (model calls, SQLite) runs on the blocking pool; the pure
//! normalization and scoring endpoints run inline.

pub mod drills;
pub mod fixer;
pub mod health;
pub mod models;
pub mod normalize;
