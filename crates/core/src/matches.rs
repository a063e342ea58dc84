//! Match results
//!
//! A [`MatchSet`] collects the tiles a match query found, deduplicated by
//! handle and kept in discovery order, together with the bonus abilities the
//! query triggered.

use std::collections::HashSet;

use crate::tile::TileId;
use crate::types::BonusFlags;

#[derive(Debug, Clone, Default)]
pub struct MatchSet {
    tiles: Vec<TileId>,
    seen: HashSet<TileId>,
    bonuses: BonusFlags,
}

impl MatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one tile; returns false if it was already present
    pub fn add(&mut self, id: TileId) -> bool {
        if self.seen.insert(id) {
            self.tiles.push(id);
            true
        } else {
            false
        }
    }

    pub fn extend<I: IntoIterator<Item = TileId>>(&mut self, ids: I) {
        for id in ids {
            self.add(id);
        }
    }

    /// Union another set into this one (tiles and bonus flags)
    pub fn merge(&mut self, other: &MatchSet) {
        self.extend(other.tiles.iter().copied());
        self.bonuses.insert(other.bonuses);
    }

    pub fn add_bonus(&mut self, flags: BonusFlags) {
        self.bonuses.insert(flags);
    }

    pub fn bonuses(&self) -> BonusFlags {
        self.bonuses
    }

    /// True when a row/column-clear tile expanded this match
    pub fn triggered_clear(&self) -> bool {
        self.bonuses.contains(BonusFlags::CLEAR_ROW_OR_COLUMN)
    }

    pub fn contains(&self, id: TileId) -> bool {
        self.seen.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tiles(&self) -> &[TileId] {
        &self.tiles
    }

    pub fn iter(&self) -> impl Iterator<Item = TileId> + '_ {
        self.tiles.iter().copied()
    }
}

impl PartialEq for MatchSet {
    fn eq(&self, other: &Self) -> bool {
        self.bonuses == other.bonuses && self.seen == other.seen
    }
}

impl Eq for MatchSet {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TileArena;
    use crate::types::{Position, TileKind};

    fn ids(n: usize) -> Vec<TileId> {
        let mut arena = TileArena::new();
        (0..n)
            .map(|c| arena.alloc(TileKind::Red, BonusFlags::NONE, Position::new(0, c)))
            .collect()
    }

    #[test]
    fn duplicates_are_ignored() {
        let ids = ids(3);
        let mut set = MatchSet::new();
        assert!(set.add(ids[0]));
        assert!(!set.add(ids[0]));
        set.extend(ids.iter().copied());
        set.extend(ids.iter().copied());
        assert_eq!(set.len(), 3);
        assert_eq!(set.tiles(), &ids[..]);
    }

    #[test]
    fn merge_unions_tiles_and_flags() {
        let ids = ids(4);
        let mut a = MatchSet::new();
        a.extend(ids[..3].iter().copied());
        let mut b = MatchSet::new();
        b.extend(ids[2..].iter().copied());
        b.add_bonus(BonusFlags::CLEAR_ROW_OR_COLUMN);

        a.merge(&b);
        assert_eq!(a.len(), 4);
        assert!(a.triggered_clear());

        // Setting the flag twice leaves it set once.
        a.add_bonus(BonusFlags::CLEAR_ROW_OR_COLUMN);
        assert_eq!(a.bonuses(), BonusFlags::CLEAR_ROW_OR_COLUMN);
    }

    #[test]
    fn equality_ignores_order() {
        let ids = ids(3);
        let mut a = MatchSet::new();
        a.extend(ids.iter().copied());
        let mut b = MatchSet::new();
        b.extend(ids.iter().rev().copied());
        assert_eq!(a, b);
    }
}
