//! Grid module - slot storage, matching and gravity
//!
//! The grid is a `rows x columns` array of optional tile handles, row-major,
//! with row 0 at the bottom. It also owns the tile arena, so every primitive
//! that moves a tile rewrites the slot and the tile's own row/column together.
//!
//! Coordinates are validated with assertions: an out-of-range `(row, column)`
//! is a caller bug and panics rather than returning an error.

use std::fmt;

use arrayvec::ArrayVec;

use crate::alteration::AlterationSet;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::matches::MatchSet;
use crate::tile::{Tile, TileArena, TileId};
use crate::types::{BonusFlags, Position, TileKind, MAX_GRID_DIM, MINIMUM_MATCHES};

/// Contiguous same-kind tiles along one axis, seed first
type Run = ArrayVec<TileId, MAX_GRID_DIM>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone)]
pub struct Grid {
    rows: usize,
    columns: usize,
    min_matches: usize,
    cells: Vec<Option<TileId>>,
    tiles: TileArena,
    /// Most recent swap, for `undo_swap`
    last_swap: Option<(TileId, TileId)>,
}

impl Grid {
    /// Create an empty grid using the default match threshold
    ///
    /// # Panics
    ///
    /// Panics if either dimension is 0 or larger than [`MAX_GRID_DIM`].
    pub fn new(rows: usize, columns: usize) -> Self {
        assert!(
            (1..=MAX_GRID_DIM).contains(&rows) && (1..=MAX_GRID_DIM).contains(&columns),
            "grid dimensions {}x{} outside 1..={}",
            rows,
            columns,
            MAX_GRID_DIM
        );
        Self {
            rows,
            columns,
            min_matches: MINIMUM_MATCHES,
            cells: vec![None; rows * columns],
            tiles: TileArena::new(),
            last_swap: None,
        }
    }

    /// Create an empty grid sized and tuned by `config`
    pub fn from_config(config: &EngineConfig) -> Self {
        let mut grid = Self::new(config.rows, config.columns);
        grid.min_matches = config.min_matches;
        grid
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn min_matches(&self) -> usize {
        self.min_matches
    }

    #[inline(always)]
    fn index(&self, row: usize, column: usize) -> usize {
        assert!(
            row < self.rows && column < self.columns,
            "grid position ({}, {}) out of bounds for {}x{} grid",
            row,
            column,
            self.rows,
            self.columns
        );
        row * self.columns + column
    }

    /// Check whether a position lies on the grid
    pub fn contains(&self, position: Position) -> bool {
        position.row < self.rows && position.column < self.columns
    }

    /// Tile at `(row, column)`, if the slot is occupied
    pub fn get(&self, row: usize, column: usize) -> Option<&Tile> {
        self.cells[self.index(row, column)].and_then(|id| self.tiles.get(id))
    }

    /// Handle of the tile at `(row, column)`, if the slot is occupied
    pub fn id_at(&self, row: usize, column: usize) -> Option<TileId> {
        self.cells[self.index(row, column)]
    }

    /// Look up a tile by handle; `None` once it has been removed
    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id)
    }

    fn live(&self, id: TileId) -> Result<Tile> {
        self.tiles.get(id).copied().ok_or(EngineError::StaleTile(id))
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.tiles.len() == self.cells.len()
    }

    /// Slot contents in row-major order, bottom row first
    pub fn slots(&self) -> &[Option<TileId>] {
        &self.cells
    }

    /// Every tile on the grid, bottom row first, left to right
    pub fn iter(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.cells
            .iter()
            .filter_map(move |cell| cell.and_then(|id| self.tiles.get(id)))
    }

    /// Put a new tile at `(row, column)`, releasing any tile already there
    pub fn place(&mut self, row: usize, column: usize, kind: TileKind, bonus: BonusFlags) -> TileId {
        let idx = self.index(row, column);
        if let Some(old) = self.cells[idx].take() {
            self.tiles.release(old);
        }
        let id = self.tiles.alloc(kind, bonus, Position::new(row, column));
        self.cells[idx] = Some(id);
        id
    }

    fn set_position(&mut self, id: TileId, position: Position) {
        if let Some(tile) = self.tiles.get_mut(id) {
            tile.row = position.row;
            tile.column = position.column;
        }
    }

    /// Exchange two tiles' slots and remember the pair for [`Grid::undo_swap`]
    ///
    /// Adjacency is the caller's concern; any two live tiles can be swapped.
    pub fn swap(&mut self, a: TileId, b: TileId) -> Result<()> {
        let ta = self.live(a)?;
        let tb = self.live(b)?;

        let ia = self.index(ta.row, ta.column);
        let ib = self.index(tb.row, tb.column);
        self.cells.swap(ia, ib);
        self.set_position(a, tb.position());
        self.set_position(b, ta.position());

        self.last_swap = Some((a, b));
        Ok(())
    }

    /// Reverse the most recent swap
    ///
    /// Only one swap is remembered, and undoing consumes it.
    pub fn undo_swap(&mut self) -> Result<()> {
        let (a, b) = self.last_swap.take().ok_or(EngineError::NoSwapToUndo)?;
        self.swap(a, b)?;
        self.last_swap = None;
        Ok(())
    }

    pub fn last_swap(&self) -> Option<(TileId, TileId)> {
        self.last_swap
    }

    /// Empty the tile's slot and release it, returning its final value
    ///
    /// Neighbouring tiles stay where they are until [`Grid::collapse`].
    pub fn remove(&mut self, id: TileId) -> Result<Tile> {
        let tile = self.live(id)?;
        let idx = self.index(tile.row, tile.column);
        self.cells[idx] = None;
        self.tiles.release(id).ok_or(EngineError::StaleTile(id))
    }

    /// Drop every tile (level reset)
    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|cell| *cell = None);
        self.tiles.clear();
        self.last_swap = None;
    }

    /// Check whether two live tiles sit side by side or one above the other
    pub fn are_adjacent(&self, a: TileId, b: TileId) -> Result<bool> {
        Ok(self.live(a)?.position().is_adjacent(self.live(b)?.position()))
    }

    /// Push the tile at `(row, column)` onto `run` if it has the seed's kind.
    /// Returns false at the first empty or different slot.
    fn extend_run(&self, run: &mut Run, seed: &Tile, row: usize, column: usize) -> bool {
        match self.get(row, column) {
            Some(tile) if tile.is_same_kind(seed) => {
                run.push(tile.id);
                true
            }
            _ => false,
        }
    }

    fn scan_run(&self, seed: &Tile, axis: Axis) -> Run {
        let mut run = Run::new();
        run.push(seed.id);

        match axis {
            Axis::Horizontal => {
                for column in (0..seed.column).rev() {
                    if !self.extend_run(&mut run, seed, seed.row, column) {
                        break;
                    }
                }
                for column in seed.column + 1..self.columns {
                    if !self.extend_run(&mut run, seed, seed.row, column) {
                        break;
                    }
                }
            }
            Axis::Vertical => {
                for row in (0..seed.row).rev() {
                    if !self.extend_run(&mut run, seed, row, seed.column) {
                        break;
                    }
                }
                for row in seed.row + 1..self.rows {
                    if !self.extend_run(&mut run, seed, row, seed.column) {
                        break;
                    }
                }
            }
        }

        // Short runs are not matches at all, seed included.
        if run.len() < self.min_matches {
            run.clear();
        }
        run
    }

    fn run_triggers_clear(&self, run: &Run) -> bool {
        run.len() >= self.min_matches
            && run
                .iter()
                .any(|&id| self.tiles.get(id).is_some_and(|t| t.clears_row_or_column()))
    }

    fn row_ids(&self, row: usize) -> impl Iterator<Item = TileId> + '_ {
        (0..self.columns).filter_map(move |column| self.id_at(row, column))
    }

    fn column_ids(&self, column: usize) -> impl Iterator<Item = TileId> + '_ {
        (0..self.rows).filter_map(move |row| self.id_at(row, column))
    }

    /// Matches through one tile
    ///
    /// The horizontal and vertical runs are judged independently. A
    /// qualifying run that holds a row/column-clear tile is replaced by the
    /// whole row (or column) and flags the result.
    pub fn find_matches(&self, id: TileId) -> Result<MatchSet> {
        let seed = self.live(id)?;
        let mut matches = MatchSet::new();

        let horizontal = self.scan_run(&seed, Axis::Horizontal);
        if self.run_triggers_clear(&horizontal) {
            matches.extend(self.row_ids(seed.row));
            matches.add_bonus(BonusFlags::CLEAR_ROW_OR_COLUMN);
        } else {
            matches.extend(horizontal);
        }

        let vertical = self.scan_run(&seed, Axis::Vertical);
        if self.run_triggers_clear(&vertical) {
            matches.extend(self.column_ids(seed.column));
            matches.add_bonus(BonusFlags::CLEAR_ROW_OR_COLUMN);
        } else {
            matches.extend(vertical);
        }

        Ok(matches)
    }

    /// Union of [`Grid::find_matches`] over many tiles
    pub fn find_matches_many<I>(&self, ids: I) -> Result<MatchSet>
    where
        I: IntoIterator<Item = TileId>,
    {
        let mut all = MatchSet::new();
        for id in ids {
            all.merge(&self.find_matches(id)?);
        }
        Ok(all)
    }

    /// Empty slots of one column, bottom to top
    pub fn empty_slots(&self, column: usize) -> Vec<Position> {
        (0..self.rows)
            .filter(|&row| self.cells[self.index(row, column)].is_none())
            .map(|row| Position::new(row, column))
            .collect()
    }

    /// Let tiles fall into the empty slots of the given columns
    ///
    /// One bottom-up sweep per column: each empty slot takes the nearest tile
    /// above it, so surviving tiles keep their vertical order. Empty slots end
    /// up at the top of the column, ready for spawning.
    pub fn collapse<I>(&mut self, columns: I) -> AlterationSet
    where
        I: IntoIterator<Item = usize>,
    {
        let mut columns: Vec<usize> = columns.into_iter().collect();
        columns.sort_unstable();
        columns.dedup();

        let mut altered = AlterationSet::new();
        for column in columns {
            for row in 0..self.rows.saturating_sub(1) {
                let target = self.index(row, column);
                if self.cells[target].is_some() {
                    continue;
                }

                let Some(source_row) =
                    (row + 1..self.rows).find(|&r| self.cells[self.index(r, column)].is_some())
                else {
                    // Nothing left above this slot.
                    break;
                };

                let source = self.index(source_row, column);
                if let Some(id) = self.cells[source].take() {
                    self.cells[target] = Some(id);
                    self.set_position(id, Position::new(row, column));
                    altered.add(id, source_row - row);
                }
            }
        }

        altered
    }

    /// Check that every slot's tile believes it is in that slot
    pub fn verify_back_references(&self) -> bool {
        let mut occupied = 0usize;
        for (idx, cell) in self.cells.iter().enumerate() {
            let Some(id) = cell else {
                continue;
            };
            occupied += 1;
            match self.tiles.get(*id) {
                Some(tile) if tile.row * self.columns + tile.column == idx && tile.id == *id => {}
                _ => return false,
            }
        }
        occupied == self.tiles.len()
    }
}

/// Debug dump, top row first
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..self.rows).rev() {
            for column in 0..self.columns {
                match self.get(row, column) {
                    None => write!(f, "NULL|")?,
                    Some(tile) => {
                        let marker = if tile.clears_row_or_column() { 'B' } else { ' ' };
                        write!(f, "{}{} |", tile.kind.code(), marker)?;
                    }
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KINDS: [TileKind; 6] = [
        TileKind::Red,
        TileKind::Blue,
        TileKind::Green,
        TileKind::Orange,
        TileKind::Purple,
        TileKind::Yellow,
    ];

    /// Full grid with no runs of three anywhere
    fn striped(rows: usize, columns: usize) -> Grid {
        let mut grid = Grid::new(rows, columns);
        for row in 0..rows {
            for column in 0..columns {
                grid.place(row, column, KINDS[(column + 2 * row) % 6], BonusFlags::NONE);
            }
        }
        grid
    }

    #[test]
    fn test_index_calculation() {
        let grid = Grid::new(12, 8);
        assert_eq!(grid.index(0, 0), 0);
        assert_eq!(grid.index(0, 7), 7);
        assert_eq!(grid.index(1, 0), 8);
        assert_eq!(grid.index(11, 7), 95);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_get_out_of_bounds_panics() {
        let grid = Grid::new(12, 8);
        let _ = grid.get(12, 0);
    }

    #[test]
    fn test_striped_grid_has_no_matches() {
        let grid = striped(12, 8);
        assert!(grid.is_full());
        let all = grid.find_matches_many(grid.slots().iter().flatten().copied()).unwrap();
        assert!(all.is_empty());
    }

    #[test]
    fn test_place_replaces_occupant() {
        let mut grid = Grid::new(4, 4);
        let first = grid.place(1, 1, TileKind::Red, BonusFlags::NONE);
        let second = grid.place(1, 1, TileKind::Blue, BonusFlags::NONE);
        assert!(grid.tile(first).is_none());
        assert_eq!(grid.id_at(1, 1), Some(second));
        assert_eq!(grid.len(), 1);
        assert!(grid.verify_back_references());
    }

    #[test]
    fn test_vertical_run_stops_at_empty_slot() {
        let mut grid = Grid::new(6, 3);
        let seed = grid.place(0, 0, TileKind::Red, BonusFlags::NONE);
        grid.place(1, 0, TileKind::Red, BonusFlags::NONE);
        // Gap at row 2.
        grid.place(3, 0, TileKind::Red, BonusFlags::NONE);
        assert!(grid.find_matches(seed).unwrap().is_empty());

        grid.place(2, 0, TileKind::Red, BonusFlags::NONE);
        assert_eq!(grid.find_matches(seed).unwrap().len(), 4);
    }

    #[test]
    fn test_collapse_reports_distances() {
        let mut grid = Grid::new(6, 1);
        let low = grid.place(1, 0, TileKind::Red, BonusFlags::NONE);
        let high = grid.place(4, 0, TileKind::Blue, BonusFlags::NONE);

        let altered = grid.collapse([0, 0]);
        assert_eq!(altered.tiles(), &[low, high]);
        assert_eq!(altered.max_distance(), 3);
        assert_eq!(grid.tile(low).unwrap().row, 0);
        assert_eq!(grid.tile(high).unwrap().row, 1);
        assert_eq!(grid.empty_slots(0).len(), 4);
        assert!(grid.verify_back_references());
    }

    #[test]
    fn test_display_dump() {
        let mut grid = Grid::new(2, 2);
        grid.place(0, 0, TileKind::Red, BonusFlags::CLEAR_ROW_OR_COLUMN);
        grid.place(0, 1, TileKind::Blue, BonusFlags::NONE);
        grid.place(1, 1, TileKind::Green, BonusFlags::NONE);
        assert_eq!(grid.to_string(), "NULL|gr  |\nreB |bl  |\n");
    }
}
