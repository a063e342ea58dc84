//! Level sources - initial layouts and replacement tiles
//!
//! A [`LevelSource`] decides what goes in every slot when a level starts and
//! what kind each refill tile has during a cascade. Two sources ship here:
//!
//! - [`RandomLevel`]: uniform picks, rejecting a kind that would complete a
//!   run of three with the two tiles to its left or the two below it.
//! - [`PremadeLevel`]: a literal layout, one line per row (bottom row first),
//!   cells separated by `|`, each cell `KIND` or `KIND_B` for a bonus tile.
//!   Refills fall back to a seeded [`RandomLevel`].

use crate::error::{EngineError, Result};
use crate::grid::Grid;
use crate::rng::SimpleRng;
use crate::types::{BonusFlags, Position, TileKind};

/// What to put in one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSpec {
    pub kind: TileKind,
    pub bonus: BonusFlags,
}

impl TileSpec {
    pub fn plain(kind: TileKind) -> Self {
        Self {
            kind,
            bonus: BonusFlags::NONE,
        }
    }

    pub fn bonus(kind: TileKind) -> Self {
        Self {
            kind,
            bonus: BonusFlags::CLEAR_ROW_OR_COLUMN,
        }
    }

    /// Parse one layout cell: `KIND` or `KIND_B`
    ///
    /// # Examples
    ///
    /// ```
    /// use candy_match_core::level::TileSpec;
    /// use candy_match_core::types::TileKind;
    ///
    /// assert_eq!(TileSpec::parse("red").unwrap(), TileSpec::plain(TileKind::Red));
    /// assert_eq!(TileSpec::parse("Blue_B").unwrap(), TileSpec::bonus(TileKind::Blue));
    /// assert!(TileSpec::parse("red_X").is_err());
    /// ```
    pub fn parse(token: &str) -> Result<Self> {
        let parts: Vec<&str> = token.trim().split('_').collect();
        let kind_of = |name: &str| {
            TileKind::from_str(name)
                .ok_or_else(|| EngineError::DataFormat(format!("unknown tile kind: {:?}", name)))
        };

        match parts.as_slice() {
            [name] => Ok(Self::plain(kind_of(*name)?)),
            [name, suffix] if suffix.trim() == "B" => Ok(Self::bonus(kind_of(*name)?)),
            _ => Err(EngineError::DataFormat(format!(
                "malformed tile spec: {:?}",
                token.trim()
            ))),
        }
    }
}

/// Supplies tiles to a grid
pub trait LevelSource {
    /// Tile for `position` while the level is being filled.
    ///
    /// Slots are filled bottom row first, left to right, so every slot below
    /// and to the left of `position` is already occupied.
    fn initial_tile(&mut self, grid: &Grid, position: Position) -> Result<TileSpec>;

    /// Kind of the replacement tile that will drop into `position`.
    fn spawn_kind(&mut self, position: Position) -> Result<TileKind>;
}

/// Fill every slot of `grid` from `source`, bottom row first
pub fn populate(grid: &mut Grid, source: &mut dyn LevelSource) -> Result<()> {
    grid.clear();
    for row in 0..grid.rows() {
        for column in 0..grid.columns() {
            let spec = source.initial_tile(grid, Position::new(row, column))?;
            grid.place(row, column, spec.kind, spec.bonus);
        }
    }
    Ok(())
}

/// Uniformly random tiles
#[derive(Debug, Clone)]
pub struct RandomLevel {
    rng: SimpleRng,
    kinds: Vec<TileKind>,
}

impl RandomLevel {
    /// At least three distinct kinds are needed so a legal pick always exists.
    pub fn new(seed: u32, kinds: &[TileKind]) -> Result<Self> {
        let mut distinct = kinds.to_vec();
        distinct.sort_unstable();
        distinct.dedup();
        if distinct.len() < 3 {
            return Err(EngineError::Config(format!(
                "random levels need at least 3 distinct kinds, got {}",
                distinct.len()
            )));
        }
        Ok(Self {
            rng: SimpleRng::new(seed),
            kinds: kinds.to_vec(),
        })
    }

    fn pick(&mut self) -> TileKind {
        *self.rng.pick(&self.kinds)
    }

    fn completes_run(grid: &Grid, position: Position, kind: TileKind) -> bool {
        let same = |row: usize, column: usize| grid.get(row, column).is_some_and(|t| t.kind == kind);
        let Position { row, column } = position;

        (column >= 2 && same(row, column - 1) && same(row, column - 2))
            || (row >= 2 && same(row - 1, column) && same(row - 2, column))
    }
}

impl LevelSource for RandomLevel {
    fn initial_tile(&mut self, grid: &Grid, position: Position) -> Result<TileSpec> {
        let mut kind = self.pick();
        while Self::completes_run(grid, position, kind) {
            kind = self.pick();
        }
        Ok(TileSpec::plain(kind))
    }

    fn spawn_kind(&mut self, _position: Position) -> Result<TileKind> {
        Ok(self.pick())
    }
}

/// A literal layout
#[derive(Debug, Clone)]
pub struct PremadeLevel {
    /// Row-major, bottom row first
    cells: Vec<TileSpec>,
    rows: usize,
    columns: usize,
    refill: RandomLevel,
}

impl PremadeLevel {
    /// Parse a layout of exactly `rows` non-blank lines of `columns` cells.
    ///
    /// The first line is row 0 (the bottom row). Blank cells from a trailing
    /// `|` are ignored.
    pub fn parse(text: &str, rows: usize, columns: usize, refill: RandomLevel) -> Result<Self> {
        let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        if lines.len() != rows {
            return Err(EngineError::DataFormat(format!(
                "expected {} rows, found {}",
                rows,
                lines.len()
            )));
        }

        let mut cells = Vec::with_capacity(rows * columns);
        for (row, line) in lines.iter().enumerate() {
            let tokens: Vec<&str> = line
                .split('|')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect();
            if tokens.len() != columns {
                return Err(EngineError::DataFormat(format!(
                    "row {}: expected {} cells, found {}",
                    row,
                    columns,
                    tokens.len()
                )));
            }
            for (column, token) in tokens.iter().enumerate() {
                let spec = TileSpec::parse(token).map_err(|e| match e {
                    EngineError::DataFormat(msg) => {
                        EngineError::DataFormat(format!("row {}, column {}: {}", row, column, msg))
                    }
                    other => other,
                })?;
                cells.push(spec);
            }
        }

        Ok(Self {
            cells,
            rows,
            columns,
            refill,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn spec(&self, position: Position) -> Option<TileSpec> {
        if position.row >= self.rows || position.column >= self.columns {
            return None;
        }
        self.cells.get(position.row * self.columns + position.column).copied()
    }
}

impl LevelSource for PremadeLevel {
    fn initial_tile(&mut self, _grid: &Grid, position: Position) -> Result<TileSpec> {
        self.spec(position).ok_or_else(|| {
            EngineError::DataFormat(format!(
                "layout is {}x{}, no cell at {}",
                self.rows, self.columns, position
            ))
        })
    }

    fn spawn_kind(&mut self, position: Position) -> Result<TileKind> {
        self.refill.spawn_kind(position)
    }
}
