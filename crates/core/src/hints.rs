//! Move hints
//!
//! Tries every right and upward neighbour swap on a scratch copy of the grid,
//! bottom row first, and reports the first one that would match.

use crate::grid::Grid;
use crate::tile::TileId;

/// A swap that would produce a match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hint {
    pub first: TileId,
    pub second: TileId,
    /// Tiles the swap would clear
    pub matched: Vec<TileId>,
}

pub fn find_potential_match(grid: &Grid) -> Option<Hint> {
    let mut scratch = grid.clone();
    let (rows, columns) = (grid.rows(), grid.columns());

    for row in 0..rows {
        for column in 0..columns {
            let Some(first) = scratch.id_at(row, column) else {
                continue;
            };
            for (r, c) in [(row, column + 1), (row + 1, column)] {
                if r >= rows || c >= columns {
                    continue;
                }
                let Some(second) = scratch.id_at(r, c) else {
                    continue;
                };
                let same_kind = match (scratch.tile(first), scratch.tile(second)) {
                    (Some(a), Some(b)) => a.is_same_kind(b),
                    _ => true,
                };
                if same_kind {
                    continue;
                }

                scratch.swap(first, second).ok()?;
                let found = scratch.find_matches(first).and_then(|mut found| {
                    found.merge(&scratch.find_matches(second)?);
                    Ok(found)
                });
                scratch.undo_swap().ok()?;

                let found = found.ok()?;
                if found.len() >= scratch.min_matches() {
                    return Some(Hint {
                        first,
                        second,
                        matched: found.tiles().to_vec(),
                    });
                }
            }
        }
    }
    None
}

/// True if at least one swap would match
pub fn has_possible_moves(grid: &Grid) -> bool {
    find_potential_match(grid).is_some()
}
