//! Cascade resolution - the swap -> match -> remove -> fall -> refill loop
//!
//! [`CascadeResolver`] owns the grid and walks it through one explicit state
//! machine:
//!
//! ```text
//! Idle --request_swap--> SwapPending --settle_swap--> Idle        (no match, reverted)
//!                                                 \-> Resolving   (match)
//! Resolving --resolve_one_iteration--> Resolving | Idle
//! ```
//!
//! Each transition is a plain method call, so a presentation layer can run
//! its animations between steps (see `candy_match_adapter::runtime`), while
//! headless callers use [`CascadeResolver::swap_and_resolve`]. Everything a
//! collaborator needs to know is queued as [`CascadeEvent`]s.
//!
//! Scoring per iteration: `(matched - 2) * match_score`, plus
//! `cascade_bonus_score` from the second iteration on.

use serde::{Deserialize, Serialize};

use crate::alteration::AlterationSet;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::events::{dispatch, CascadeEvent, Presentation, ScoreListener};
use crate::grid::Grid;
use crate::hints::{find_potential_match, Hint};
use crate::level::{populate, LevelSource};
use crate::matches::MatchSet;
use crate::snapshot::BoardSnapshot;
use crate::tile::{Tile, TileId};
use crate::types::{BonusFlags, Position, TileKind};

/// Coarse state, exposed for callers and snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadePhase {
    Idle,
    SwapPending,
    Resolving,
}

/// Result of [`CascadeResolver::request_swap`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapRequest {
    /// The tiles were swapped; call [`CascadeResolver::settle_swap`] next.
    Pending,
    /// The tiles are not orthogonal neighbours. Nothing changed.
    Rejected,
}

/// How a swap attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapOutcome {
    Rejected,
    Reverted,
    Accepted { matched: usize },
}

/// One cascade iteration, as seen by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    pub iteration: u32,
    pub score_delta: u32,
    pub removed: usize,
    pub bonus_created: bool,
    pub max_distance: usize,
    /// True when the grid is stable and the resolver is idle again.
    pub finished: bool,
}

/// A whole swap, resolved to completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeSummary {
    pub outcome: SwapOutcome,
    pub iterations: u32,
    pub score_delta: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingBonus {
    kind: TileKind,
    position: Position,
}

#[derive(Debug, Clone)]
struct Resolution {
    iteration: u32,
    matches: MatchSet,
    pending_bonus: Option<PendingBonus>,
    score_delta: u64,
}

#[derive(Debug, Clone)]
enum State {
    Idle,
    SwapPending { first: TileId, second: TileId },
    Resolving(Resolution),
}

#[derive(Debug, Clone)]
pub struct CascadeResolver {
    config: EngineConfig,
    grid: Grid,
    state: State,
    score: u64,
    moves: u32,
    events: Vec<CascadeEvent>,
}

impl CascadeResolver {
    /// Build an empty resolver; call [`CascadeResolver::load`] before playing.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let grid = Grid::from_config(&config);
        Ok(Self {
            config,
            grid,
            state: State::Idle,
            score: 0,
            moves: 0,
            events: Vec::new(),
        })
    }

    /// Fill the grid from `source` and reset score, moves and events.
    ///
    /// Bonus tiles in the layout must have a bonus variant in the config.
    /// On error the grid is left empty.
    pub fn load(&mut self, source: &mut dyn LevelSource) -> Result<()> {
        self.state = State::Idle;
        self.score = 0;
        self.moves = 0;
        self.events.clear();

        let loaded = populate(&mut self.grid, source).and_then(|()| {
            self.grid
                .iter()
                .filter(|tile| tile.clears_row_or_column())
                .try_for_each(|tile| self.config.require_bonus_variant(tile.kind))
        });
        if loaded.is_err() {
            self.grid.clear();
        }
        loaded
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    /// Accepted swaps since the last load
    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn phase(&self) -> CascadePhase {
        match self.state {
            State::Idle => CascadePhase::Idle,
            State::SwapPending { .. } => CascadePhase::SwapPending,
            State::Resolving(_) => CascadePhase::Resolving,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, State::Idle)
    }

    /// First swap that would match, if any (see [`find_potential_match`])
    pub fn hint(&self) -> Option<Hint> {
        find_potential_match(&self.grid)
    }

    /// Drain queued events (oldest first)
    pub fn take_events(&mut self) -> Vec<CascadeEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drain queued events into the given collaborators
    pub fn dispatch_events(
        &mut self,
        presentation: &mut dyn Presentation,
        scoring: &mut dyn ScoreListener,
    ) {
        let events = self.take_events();
        dispatch(&events, presentation, scoring);
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot::from_grid(&self.grid, self.phase(), self.score, self.moves)
    }

    /// Swap two tiles if they are orthogonal neighbours
    ///
    /// Only legal while idle. A rejected request changes nothing.
    pub fn request_swap(&mut self, first: TileId, second: TileId) -> Result<SwapRequest> {
        if !self.is_idle() {
            return Err(EngineError::Busy);
        }
        if !self.grid.are_adjacent(first, second)? {
            return Ok(SwapRequest::Rejected);
        }

        self.grid.swap(first, second)?;
        let (a, b) = self.pair(first, second)?;
        self.events.push(CascadeEvent::Swapped { first: a, second: b });
        self.state = State::SwapPending { first, second };
        Ok(SwapRequest::Pending)
    }

    /// Decide the pending swap: revert it, or start resolving its matches
    ///
    /// A row/column-clear bonus is earned when the swap matched at least
    /// `min_matches_for_bonus` tiles without itself triggering a clear. It
    /// goes where the first tile landed if that tile matched, otherwise
    /// where the second one landed. A bonus kind with no variant in the
    /// config undoes the swap and fails with `Config` before anything is
    /// removed.
    pub fn settle_swap(&mut self) -> Result<SwapOutcome> {
        let (first, second) = match self.state {
            State::SwapPending { first, second } => (first, second),
            _ => return Err(EngineError::NotSwapPending),
        };

        let first_matches = self.grid.find_matches(first)?;
        let second_matches = self.grid.find_matches(second)?;
        let mut total = first_matches.clone();
        total.merge(&second_matches);

        if total.len() < self.config.min_matches {
            self.grid.undo_swap()?;
            let (a, b) = self.pair(first, second)?;
            self.events.push(CascadeEvent::SwapReverted { first: a, second: b });
            self.state = State::Idle;
            return Ok(SwapOutcome::Reverted);
        }

        let earns_bonus = total.len() >= self.config.min_matches_for_bonus
            && !first_matches.triggered_clear()
            && !second_matches.triggered_clear();
        let pending_bonus = if earns_bonus {
            let anchor = if first_matches.is_empty() { second } else { first };
            let tile = self.live(anchor)?;
            Some(PendingBonus {
                kind: tile.kind,
                position: tile.position(),
            })
        } else {
            None
        };
        if let Some(bonus) = pending_bonus {
            if let Err(err) = self.config.require_bonus_variant(bonus.kind) {
                self.grid.undo_swap()?;
                let (a, b) = self.pair(first, second)?;
                self.events.push(CascadeEvent::SwapReverted { first: a, second: b });
                self.state = State::Idle;
                return Err(err);
            }
        }

        self.moves += 1;
        let matched = total.len();
        self.state = State::Resolving(Resolution {
            iteration: 1,
            matches: total,
            pending_bonus,
            score_delta: 0,
        });
        Ok(SwapOutcome::Accepted { matched })
    }

    /// Run one iteration: score, remove, place the bonus, collapse, refill,
    /// then look for follow-up matches among every tile that moved.
    ///
    /// An error abandons the cascade and leaves the resolver idle.
    pub fn resolve_one_iteration(&mut self, source: &mut dyn LevelSource) -> Result<StepReport> {
        let mut resolution = match std::mem::replace(&mut self.state, State::Idle) {
            State::Resolving(resolution) => resolution,
            other => {
                self.state = other;
                return Err(EngineError::NotResolving);
            }
        };
        let iteration = resolution.iteration;

        let matched = resolution.matches.len();
        let mut delta = (matched.saturating_sub(2) as u32).saturating_mul(self.config.match_score);
        if iteration >= 2 {
            delta = delta.saturating_add(self.config.cascade_bonus_score);
        }
        self.score += u64::from(delta);
        resolution.score_delta += u64::from(delta);
        self.events.push(CascadeEvent::ScoreChanged {
            iteration,
            delta,
            total: self.score,
        });

        let mut removed = Vec::with_capacity(matched);
        for id in resolution.matches.iter() {
            removed.push(self.grid.remove(id)?);
        }
        let mut columns: Vec<usize> = removed.iter().map(|tile| tile.column).collect();
        columns.sort_unstable();
        columns.dedup();
        let removed_count = removed.len();
        self.events.push(CascadeEvent::TilesRemoved { tiles: removed });

        let bonus_created = match resolution.pending_bonus.take() {
            Some(bonus) => {
                let id = self.grid.place(
                    bonus.position.row,
                    bonus.position.column,
                    bonus.kind,
                    BonusFlags::CLEAR_ROW_OR_COLUMN,
                );
                let tile = self.live(id)?;
                self.events.push(CascadeEvent::BonusCreated { tile });
                true
            }
            None => false,
        };

        let collapsed = self.grid.collapse(columns.iter().copied());

        let rows = self.grid.rows();
        let mut spawned = AlterationSet::new();
        for &column in &columns {
            for position in self.grid.empty_slots(column) {
                let kind = source.spawn_kind(position)?;
                let id = self
                    .grid
                    .place(position.row, position.column, kind, BonusFlags::NONE);
                spawned.add(id, rows - position.row);
            }
        }

        let max_distance = collapsed.max_distance().max(spawned.max_distance());
        self.events.push(CascadeEvent::TilesMoved {
            collapsed: self.tiles_of(&collapsed),
            spawned: self.tiles_of(&spawned),
            max_distance,
        });

        let next = self
            .grid
            .find_matches_many(collapsed.iter().chain(spawned.iter()))?;
        let finished = next.len() < self.config.min_matches;
        if finished {
            self.events.push(CascadeEvent::CascadeFinished {
                iterations: iteration,
                score_delta: resolution.score_delta,
            });
        } else {
            resolution.iteration += 1;
            resolution.matches = next;
            self.state = State::Resolving(resolution);
        }

        Ok(StepReport {
            iteration,
            score_delta: delta,
            removed: removed_count,
            bonus_created,
            max_distance,
            finished,
        })
    }

    /// Request, settle and fully resolve one swap
    pub fn swap_and_resolve(
        &mut self,
        first: TileId,
        second: TileId,
        source: &mut dyn LevelSource,
    ) -> Result<CascadeSummary> {
        let mut summary = CascadeSummary {
            outcome: SwapOutcome::Rejected,
            iterations: 0,
            score_delta: 0,
        };
        if self.request_swap(first, second)? == SwapRequest::Rejected {
            return Ok(summary);
        }

        summary.outcome = self.settle_swap()?;
        if let SwapOutcome::Accepted { .. } = summary.outcome {
            loop {
                let step = self.resolve_one_iteration(source)?;
                summary.iterations = step.iteration;
                summary.score_delta += u64::from(step.score_delta);
                if step.finished {
                    break;
                }
            }
        }
        Ok(summary)
    }

    /// [`CascadeResolver::swap_and_resolve`] addressed by slot
    ///
    /// An empty slot is rejected like a non-adjacent pair.
    pub fn swap_positions(
        &mut self,
        first: Position,
        second: Position,
        source: &mut dyn LevelSource,
    ) -> Result<CascadeSummary> {
        let ids = (
            self.grid.id_at(first.row, first.column),
            self.grid.id_at(second.row, second.column),
        );
        match ids {
            (Some(a), Some(b)) => self.swap_and_resolve(a, b, source),
            _ => Ok(CascadeSummary {
                outcome: SwapOutcome::Rejected,
                iterations: 0,
                score_delta: 0,
            }),
        }
    }

    fn live(&self, id: TileId) -> Result<Tile> {
        self.grid.tile(id).copied().ok_or(EngineError::StaleTile(id))
    }

    fn pair(&self, first: TileId, second: TileId) -> Result<(Tile, Tile)> {
        Ok((self.live(first)?, self.live(second)?))
    }

    fn tiles_of(&self, set: &AlterationSet) -> Vec<Tile> {
        set.iter()
            .filter_map(|id| self.grid.tile(id).copied())
            .collect()
    }
}
