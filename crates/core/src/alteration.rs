//! Alteration results
//!
//! An [`AlterationSet`] lists the tiles a collapse or spawn moved and the
//! longest distance (in rows) any of them travelled. Presentation scales its
//! move animations by that distance.

use std::collections::HashSet;

use crate::tile::TileId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlterationSet {
    tiles: Vec<TileId>,
    seen: HashSet<TileId>,
    max_distance: usize,
}

impl AlterationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a moved tile; the running maximum updates even for duplicates
    pub fn add(&mut self, id: TileId, distance: usize) {
        if self.seen.insert(id) {
            self.tiles.push(id);
        }
        self.max_distance = self.max_distance.max(distance);
    }

    pub fn max_distance(&self) -> usize {
        self.max_distance
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn contains(&self, id: TileId) -> bool {
        self.seen.contains(&id)
    }

    pub fn tiles(&self) -> &[TileId] {
        &self.tiles
    }

    pub fn iter(&self) -> impl Iterator<Item = TileId> + '_ {
        self.tiles.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TileArena;
    use crate::types::{BonusFlags, Position, TileKind};

    #[test]
    fn tracks_running_maximum() {
        let mut arena = TileArena::new();
        let a = arena.alloc(TileKind::Blue, BonusFlags::NONE, Position::new(0, 0));
        let b = arena.alloc(TileKind::Blue, BonusFlags::NONE, Position::new(1, 0));

        let mut set = AlterationSet::new();
        assert_eq!(set.max_distance(), 0);
        set.add(a, 2);
        set.add(b, 5);
        set.add(a, 3);
        assert_eq!(set.len(), 2);
        assert_eq!(set.max_distance(), 5);
        assert!(set.contains(a) && set.contains(b));
    }
}
