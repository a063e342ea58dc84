//! Core board engine - pure, deterministic, and testable
//!
//! This crate holds the board state and every rule that changes it. It has
//! **no dependencies** on rendering, async runtimes or I/O beyond reading a
//! config file, so it is:
//!
//! - **Deterministic**: the same seed and the same swaps give the same board
//! - **Testable**: each rule is a plain method on plain data
//! - **Portable**: headless, terminal or GUI front ends drive it the same way
//!
//! # Module Structure
//!
//! - [`grid`]: the `rows x columns` slot array, matching and gravity
//! - [`tile`]: tile records and the generational arena that owns them
//! - [`matches`] / [`alteration`]: deduplicated result sets
//! - [`cascade`]: the swap/resolve state machine and scoring
//! - [`level`]: random and premade level sources
//! - [`hints`]: first swap that would match
//! - [`events`]: what the cascade tells its collaborators
//! - [`config`] / [`error`]: tuning inputs and the engine error type
//!
//! # Game Rules
//!
//! - A match is a straight run of at least `min_matches` same-kind tiles.
//! - A run holding a row/column-clear tile clears its whole row (or column).
//! - A swap that clears `min_matches_for_bonus` tiles, and did not itself
//!   trigger a clear, leaves a bonus tile where it landed.
//! - Cleared tiles are replaced by tiles falling from above; the refill can
//!   match again, and each follow-up iteration scores a flat bonus.
//!
//! # Example
//!
//! ```
//! use candy_match_core::{CascadeResolver, EngineConfig, RandomLevel};
//!
//! let config = EngineConfig::default();
//! let mut level = RandomLevel::new(12345, &config.kinds).unwrap();
//! let mut engine = CascadeResolver::new(config).unwrap();
//! engine.load(&mut level).unwrap();
//!
//! if let Some(hint) = engine.hint() {
//!     let summary = engine.swap_and_resolve(hint.first, hint.second, &mut level).unwrap();
//!     assert!(summary.score_delta > 0);
//! }
//! assert!(engine.is_idle());
//! assert!(engine.grid().is_full());
//! ```

pub mod alteration;
pub mod cascade;
pub mod config;
pub mod error;
pub mod events;
pub mod grid;
pub mod hints;
pub mod level;
pub mod matches;
pub mod rng;
pub mod snapshot;
pub mod tile;

pub use candy_match_types as types;

// Re-export commonly used types for convenience
pub use alteration::AlterationSet;
pub use cascade::{CascadePhase, CascadeResolver, CascadeSummary, StepReport, SwapOutcome, SwapRequest};
pub use config::{EngineConfig, CONFIG_PATH_ENV};
pub use error::{EngineError, Result};
pub use events::{dispatch, CascadeEvent, Presentation, ScoreListener};
pub use grid::Grid;
pub use hints::{find_potential_match, has_possible_moves, Hint};
pub use level::{populate, LevelSource, PremadeLevel, RandomLevel, TileSpec};
pub use matches::MatchSet;
pub use rng::SimpleRng;
pub use snapshot::{BoardSnapshot, CellSnapshot};
pub use tile::{Tile, TileId};
