//! Board snapshots - serialisable views of a grid plus cascade status

use serde::{Deserialize, Serialize};

use crate::cascade::CascadePhase;
use crate::grid::Grid;
use crate::types::TileKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub kind: TileKind,
    pub bonus: bool,
}

/// Serialisable view of a board, row-major with the bottom row first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub rows: usize,
    pub columns: usize,
    pub cells: Vec<Option<CellSnapshot>>,
    pub phase: CascadePhase,
    pub score: u64,
    pub moves: u32,
}

impl BoardSnapshot {
    pub fn from_grid(grid: &Grid, phase: CascadePhase, score: u64, moves: u32) -> Self {
        let mut cells = Vec::with_capacity(grid.rows() * grid.columns());
        for row in 0..grid.rows() {
            for column in 0..grid.columns() {
                cells.push(grid.get(row, column).map(|tile| CellSnapshot {
                    kind: tile.kind,
                    bonus: tile.clears_row_or_column(),
                }));
            }
        }
        Self {
            rows: grid.rows(),
            columns: grid.columns(),
            cells,
            phase,
            score,
            moves,
        }
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<CellSnapshot> {
        if row >= self.rows || column >= self.columns {
            return None;
        }
        self.cells[row * self.columns + column]
    }

    /// Render as a premade layout (bottom row first), or `None` if any
    /// slot is empty.
    pub fn to_layout(&self) -> Option<String> {
        let mut out = String::new();
        for row in 0..self.rows {
            let mut tokens = Vec::with_capacity(self.columns);
            for column in 0..self.columns {
                let cell = self.cell(row, column)?;
                if cell.bonus {
                    tokens.push(format!("{}_B", cell.kind.as_str()));
                } else {
                    tokens.push(cell.kind.as_str().to_string());
                }
            }
            out.push_str(&tokens.join("|"));
            out.push('\n');
        }
        Some(out)
    }
}
