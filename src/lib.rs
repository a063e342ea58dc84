//! Candy match (workspace facade crate).
//!
//! Exposes `candy_match::{core, adapter, types}` while the implementation
//! lives in dedicated crates under `crates/`.

pub use candy_match_adapter as adapter;
pub use candy_match_core as core;
pub use candy_match_types as types;
