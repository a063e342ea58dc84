//! Adapter module - async presentation pacing and the event journal
//!
//! The core engine is synchronous and never waits on anything. This crate
//! puts it behind a tokio runtime so a presenter can animate each cascade
//! step before the next one runs, and optionally records every event as a
//! JSON line.
//!
//! # Pacing
//!
//! [`CascadeDriver::drive_swap`] publishes the events of each step as a
//! [`PresenterStep`] on an mpsc channel and then waits on the step's oneshot
//! settle handle:
//!
//! 1. **Swap**: `swapped`, then settle
//! 2. **Revert** (no match): `swap_reverted`, then settle
//! 3. **Iteration** (match): `score_changed`, `tiles_removed`,
//!    `bonus_created`?, `tiles_moved`, `cascade_finished`?, then settle
//! 4. **Finished**: the [`CascadeSummary`](crate::core::CascadeSummary)
//!
//! # Environment Variables
//!
//! - `CANDY_MATCH_LOG_PATH`: append every event to this JSONL file
//!
//! # Example Journal Line
//!
//! ```text
//! {"seq":3,"ts":1734000000000,"board_hash":1469598103934665603,"event":{"type":"score_changed","iteration":1,"delta":60,"total":60}}
//! ```

pub mod journal;
pub mod protocol;
pub mod runtime;

pub use candy_match_core as core;
pub use candy_match_types as types;

pub use journal::{EventJournal, LOG_PATH_ENV};
pub use protocol::{board_hash, EventEnvelope, Sequencer};
pub use runtime::{CascadeDriver, PresenterMessage, PresenterStep};
