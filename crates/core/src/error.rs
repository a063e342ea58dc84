//! Engine error type
//!
//! Recoverable failures surface as [`EngineError`]. Out-of-bounds coordinates
//! are not in here: they are caller bugs and panic at the grid boundary.

use std::fmt;

use crate::tile::TileId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// `undo_swap` was called with no swap recorded.
    NoSwapToUndo,
    /// The handle does not name a tile currently on the grid.
    StaleTile(TileId),
    /// A swap was requested while a cascade is still in flight.
    Busy,
    /// `settle_swap` was called with no swap pending.
    NotSwapPending,
    /// `resolve_one_iteration` was called outside of a cascade.
    NotResolving,
    /// Level or configuration data could not be parsed.
    DataFormat(String),
    /// Configuration is inconsistent (e.g. no bonus asset for a kind).
    Config(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::NoSwapToUndo => write!(f, "no swap recorded to undo"),
            EngineError::StaleTile(id) => write!(f, "tile {} is not on the grid", id),
            EngineError::Busy => write!(f, "a cascade is already in progress"),
            EngineError::NotSwapPending => write!(f, "no swap is pending"),
            EngineError::NotResolving => write!(f, "no cascade is being resolved"),
            EngineError::DataFormat(msg) => write!(f, "data format error: {}", msg),
            EngineError::Config(msg) => write!(f, "configuration error: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {}

pub type Result<T> = std::result::Result<T, EngineError>;
