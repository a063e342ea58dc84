//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! Everything here is plain data, usable from the engine, the adapter and the
//! autoplay binary alike.
//!
//! # Grid Dimensions
//!
//! - **Rows**: 12 (indexed 0-11, row 0 is the bottom row)
//! - **Columns**: 8 (indexed 0-7, left to right)
//! - Replacement tiles enter from above the top row.
//!
//! # Tuning Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `MINIMUM_MATCHES` | 3 | Shortest run that counts as a match |
//! | `MINIMUM_MATCHES_FOR_BONUS` | 4 | Tiles a swap must clear to award a bonus tile |
//! | `MATCH_THREE_SCORE` | 60 | Points per matched tile beyond the second |
//! | `SUBSEQUENT_MATCH_SCORE` | 1000 | Flat bonus for every cascade step after the first |
//!
//! These are defaults only; the engine reads them through its configuration.
//!
//! # Examples
//!
//! ```
//! use candy_match_types::{BonusFlags, Position, TileKind};
//!
//! let kind = TileKind::from_str("red").unwrap();
//! assert_eq!(kind, TileKind::Red);
//!
//! let mut bonus = BonusFlags::NONE;
//! bonus.insert(BonusFlags::CLEAR_ROW_OR_COLUMN);
//! assert!(bonus.contains(BonusFlags::CLEAR_ROW_OR_COLUMN));
//!
//! assert!(Position::new(0, 0).is_adjacent(Position::new(1, 0)));
//! assert!(!Position::new(0, 0).is_adjacent(Position::new(1, 1)));
//! ```

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Default grid height (12 rows)
pub const DEFAULT_ROWS: usize = 12;

/// Default grid width (8 columns)
pub const DEFAULT_COLUMNS: usize = 8;

/// Largest supported grid dimension along either axis.
///
/// Run scans use fixed-capacity buffers of this size.
pub const MAX_GRID_DIM: usize = 32;

/// Shortest contiguous run that counts as a match
pub const MINIMUM_MATCHES: usize = 3;

/// Minimum number of tiles cleared by a swap to award a bonus tile
pub const MINIMUM_MATCHES_FOR_BONUS: usize = 4;

/// Points per matched tile beyond the second
pub const MATCH_THREE_SCORE: u32 = 60;

/// Flat bonus for every cascade iteration after the first
pub const SUBSEQUENT_MATCH_SCORE: u32 = 1000;

/// The candy kinds a tile can have
///
/// Equality is nominal: two tiles match when their kinds are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileKind {
    Blue,
    Green,
    Orange,
    Purple,
    Red,
    Yellow,
}

impl TileKind {
    /// Every kind, in declaration order
    pub const ALL: [TileKind; 6] = [
        TileKind::Blue,
        TileKind::Green,
        TileKind::Orange,
        TileKind::Purple,
        TileKind::Red,
        TileKind::Yellow,
    ];

    /// Parse tile kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use candy_match_types::TileKind;
    ///
    /// assert_eq!(TileKind::from_str("blue"), Some(TileKind::Blue));
    /// assert_eq!(TileKind::from_str(" Purple "), Some(TileKind::Purple));
    /// assert_eq!(TileKind::from_str("cyan"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "blue" => Some(TileKind::Blue),
            "green" => Some(TileKind::Green),
            "orange" => Some(TileKind::Orange),
            "purple" => Some(TileKind::Purple),
            "red" => Some(TileKind::Red),
            "yellow" => Some(TileKind::Yellow),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TileKind::Blue => "blue",
            TileKind::Green => "green",
            TileKind::Orange => "orange",
            TileKind::Purple => "purple",
            TileKind::Red => "red",
            TileKind::Yellow => "yellow",
        }
    }

    /// Two-letter code used by the grid dump
    pub fn code(&self) -> &'static str {
        match self {
            TileKind::Blue => "bl",
            TileKind::Green => "gr",
            TileKind::Orange => "or",
            TileKind::Purple => "pu",
            TileKind::Red => "re",
            TileKind::Yellow => "ye",
        }
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Special abilities carried by a tile
///
/// A plain tile carries [`BonusFlags::NONE`]. The engine only ever sets
/// [`BonusFlags::CLEAR_ROW_OR_COLUMN`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BonusFlags(u8);

impl BonusFlags {
    pub const NONE: BonusFlags = BonusFlags(0);

    /// Matching this tile clears its whole row (horizontal match) or column
    /// (vertical match).
    pub const CLEAR_ROW_OR_COLUMN: BonusFlags = BonusFlags(1);

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// True when every flag in `other` is set
    pub fn contains(&self, other: BonusFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set the flags in `other`; setting an already-set flag is a no-op
    pub fn insert(&mut self, other: BonusFlags) {
        self.0 |= other.0;
    }
}

impl BitOr for BonusFlags {
    type Output = BonusFlags;

    fn bitor(self, rhs: BonusFlags) -> BonusFlags {
        BonusFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for BonusFlags {
    fn bitor_assign(&mut self, rhs: BonusFlags) {
        self.insert(rhs);
    }
}

/// A grid coordinate (row 0 is the bottom row)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub column: usize,
}

impl Position {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// True when `other` is directly left, right, above or below this position.
    ///
    /// Diagonal neighbours and the position itself are not adjacent.
    pub fn is_adjacent(&self, other: Position) -> bool {
        let dr = self.row.abs_diff(other.row);
        let dc = self.column.abs_diff(other.column);
        dr + dc == 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}
