//! Cascade events and the collaborator traits that consume them
//!
//! The resolver never calls out while it mutates the grid. It queues
//! [`CascadeEvent`]s instead; collaborators drain them with
//! [`CascadeResolver::take_events`](crate::cascade::CascadeResolver::take_events)
//! and either match on them directly or hand them to [`dispatch`].

use serde::{Deserialize, Serialize};

use crate::tile::Tile;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CascadeEvent {
    /// Two tiles traded places (values are post-swap).
    Swapped { first: Tile, second: Tile },
    /// The swap produced no match and was undone (values are post-undo).
    SwapReverted { first: Tile, second: Tile },
    /// Points awarded for one cascade iteration.
    ScoreChanged { iteration: u32, delta: u32, total: u64 },
    /// Matched tiles taken off the grid (values are their last positions).
    TilesRemoved { tiles: Vec<Tile> },
    /// A row/column-clear tile was created where the swap landed.
    BonusCreated { tile: Tile },
    /// Tiles that fell (`collapsed`) or dropped in from above (`spawned`).
    TilesMoved {
        collapsed: Vec<Tile>,
        spawned: Vec<Tile>,
        max_distance: usize,
    },
    /// The grid is stable again.
    CascadeFinished { iterations: u32, score_delta: u64 },
}

/// Visual side of the game
///
/// Every method defaults to a no-op so implementors pick what they animate.
pub trait Presentation {
    fn swapped(&mut self, _first: &Tile, _second: &Tile) {}

    fn swap_reverted(&mut self, _first: &Tile, _second: &Tile) {}

    /// Called once per removed tile.
    fn tile_removed(&mut self, _tile: &Tile) {}

    fn bonus_created(&mut self, _tile: &Tile) {}

    /// `max_distance` covers both lists; scale move durations by it.
    fn tiles_moved(&mut self, _collapsed: &[Tile], _spawned: &[Tile], _max_distance: usize) {}

    fn cascade_finished(&mut self, _iterations: u32) {}
}

/// Receives score deltas
pub trait ScoreListener {
    fn score_changed(&mut self, delta: u32, total: u64);
}

/// No-op presentation for headless callers
impl Presentation for () {}

impl ScoreListener for () {
    fn score_changed(&mut self, _delta: u32, _total: u64) {}
}

/// Route events to their collaborators, in order
pub fn dispatch(
    events: &[CascadeEvent],
    presentation: &mut dyn Presentation,
    scoring: &mut dyn ScoreListener,
) {
    for event in events {
        match event {
            CascadeEvent::Swapped { first, second } => presentation.swapped(first, second),
            CascadeEvent::SwapReverted { first, second } => {
                presentation.swap_reverted(first, second)
            }
            CascadeEvent::ScoreChanged { delta, total, .. } => scoring.score_changed(*delta, *total),
            CascadeEvent::TilesRemoved { tiles } => {
                for tile in tiles {
                    presentation.tile_removed(tile);
                }
            }
            CascadeEvent::BonusCreated { tile } => presentation.bonus_created(tile),
            CascadeEvent::TilesMoved {
                collapsed,
                spawned,
                max_distance,
            } => presentation.tiles_moved(collapsed, spawned, *max_distance),
            CascadeEvent::CascadeFinished { iterations, .. } => {
                presentation.cascade_finished(*iterations)
            }
        }
    }
}
