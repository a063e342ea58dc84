//! Tile module - tile values and the arena that owns them
//!
//! Tiles are addressed by [`TileId`], a generational handle. A handle stays
//! unique for the life of the arena: freed slots are reused with a bumped
//! generation, so a handle held past its tile's removal resolves to nothing
//! instead of to a newcomer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{BonusFlags, Position, TileKind};

/// Stable identity of one tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId {
    index: u32,
    generation: u32,
}

impl TileId {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// One playable grid cell
///
/// `row`/`column` mirror the slot that holds the tile. Only the grid moves
/// tiles, and it rewrites both fields in the same step as the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub kind: TileKind,
    pub bonus: BonusFlags,
    pub row: usize,
    pub column: usize,
}

impl Tile {
    pub fn position(&self) -> Position {
        Position::new(self.row, self.column)
    }

    pub fn is_same_kind(&self, other: &Tile) -> bool {
        self.kind == other.kind
    }

    pub fn clears_row_or_column(&self) -> bool {
        self.bonus.contains(BonusFlags::CLEAR_ROW_OR_COLUMN)
    }
}

#[derive(Debug, Clone)]
struct Entry {
    generation: u32,
    tile: Option<Tile>,
}

/// Owner of every live tile on a grid
#[derive(Debug, Clone, Default)]
pub(crate) struct TileArena {
    entries: Vec<Entry>,
    free: Vec<u32>,
    live: usize,
}

impl TileArena {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn alloc(&mut self, kind: TileKind, bonus: BonusFlags, position: Position) -> TileId {
        let id = match self.free.pop() {
            Some(index) => {
                let entry = &mut self.entries[index as usize];
                entry.generation = entry.generation.wrapping_add(1);
                TileId {
                    index,
                    generation: entry.generation,
                }
            }
            None => {
                let index = self.entries.len() as u32;
                self.entries.push(Entry {
                    generation: 0,
                    tile: None,
                });
                TileId {
                    index,
                    generation: 0,
                }
            }
        };

        self.entries[id.index as usize].tile = Some(Tile {
            id,
            kind,
            bonus,
            row: position.row,
            column: position.column,
        });
        self.live += 1;
        id
    }

    pub(crate) fn get(&self, id: TileId) -> Option<&Tile> {
        self.entries
            .get(id.index as usize)
            .filter(|e| e.generation == id.generation)
            .and_then(|e| e.tile.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: TileId) -> Option<&mut Tile> {
        self.entries
            .get_mut(id.index as usize)
            .filter(|e| e.generation == id.generation)
            .and_then(|e| e.tile.as_mut())
    }

    /// Free a tile, returning its final value
    pub(crate) fn release(&mut self, id: TileId) -> Option<Tile> {
        let entry = self
            .entries
            .get_mut(id.index as usize)
            .filter(|e| e.generation == id.generation)?;
        let tile = entry.tile.take()?;
        self.free.push(id.index);
        self.live -= 1;
        Some(tile)
    }

    pub(crate) fn len(&self) -> usize {
        self.live
    }

    pub(crate) fn clear(&mut self) {
        for (index, entry) in self.entries.iter_mut().enumerate() {
            if entry.tile.take().is_some() {
                self.free.push(index as u32);
            }
        }
        self.live = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn released_handle_goes_stale() {
        let mut arena = TileArena::new();
        let a = arena.alloc(TileKind::Red, BonusFlags::NONE, Position::new(0, 0));
        assert_eq!(arena.get(a).map(|t| t.kind), Some(TileKind::Red));

        let released = arena.release(a).unwrap();
        assert_eq!(released.id, a);
        assert!(arena.get(a).is_none());
        assert!(arena.release(a).is_none());

        // Slot is reused under a new generation.
        let b = arena.alloc(TileKind::Blue, BonusFlags::NONE, Position::new(0, 0));
        assert_eq!(b.index(), a.index());
        assert_ne!(b, a);
        assert!(arena.get(a).is_none());
        assert_eq!(arena.get(b).map(|t| t.kind), Some(TileKind::Blue));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn clear_releases_everything() {
        let mut arena = TileArena::new();
        let ids: Vec<TileId> = (0..5)
            .map(|c| arena.alloc(TileKind::Green, BonusFlags::NONE, Position::new(0, c)))
            .collect();
        assert_eq!(arena.len(), 5);
        arena.clear();
        assert_eq!(arena.len(), 0);
        assert!(ids.iter().all(|&id| arena.get(id).is_none()));
    }

    #[test]
    fn tile_bonus_queries() {
        let mut arena = TileArena::new();
        let plain = arena.alloc(TileKind::Red, BonusFlags::NONE, Position::new(1, 2));
        let bonus = arena.alloc(
            TileKind::Red,
            BonusFlags::CLEAR_ROW_OR_COLUMN,
            Position::new(1, 3),
        );
        let plain = *arena.get(plain).unwrap();
        let bonus = *arena.get(bonus).unwrap();
        assert!(!plain.clears_row_or_column());
        assert!(bonus.clears_row_or_column());
        assert!(plain.is_same_kind(&bonus));
        assert_eq!(plain.position(), Position::new(1, 2));
    }
}
