//! Engine configuration
//!
//! Grid dimensions and scoring thresholds are inputs, not contracts. The
//! defaults mirror the constants in `candy_match_types`; a JSON file named by
//! `CANDY_MATCH_CONFIG` overrides any subset of them.

use std::fs;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::types::{
    TileKind, DEFAULT_COLUMNS, DEFAULT_ROWS, MATCH_THREE_SCORE, MAX_GRID_DIM, MINIMUM_MATCHES,
    MINIMUM_MATCHES_FOR_BONUS, SUBSEQUENT_MATCH_SCORE,
};

/// Environment variable naming a JSON config file
pub const CONFIG_PATH_ENV: &str = "CANDY_MATCH_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub rows: usize,
    pub columns: usize,
    pub min_matches: usize,
    pub min_matches_for_bonus: usize,
    pub match_score: u32,
    pub cascade_bonus_score: u32,
    /// Kinds the level source picks from.
    pub kinds: Vec<TileKind>,
    /// Kinds that have a row/column-clear bonus variant.
    pub bonus_kinds: Vec<TileKind>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            columns: DEFAULT_COLUMNS,
            min_matches: MINIMUM_MATCHES,
            min_matches_for_bonus: MINIMUM_MATCHES_FOR_BONUS,
            match_score: MATCH_THREE_SCORE,
            cascade_bonus_score: SUBSEQUENT_MATCH_SCORE,
            kinds: TileKind::ALL.to_vec(),
            bonus_kinds: TileKind::ALL.to_vec(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(text)
            .map_err(|e| EngineError::DataFormat(format!("invalid config json: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the file named by `CANDY_MATCH_CONFIG`, or defaults when unset.
    pub fn from_env() -> Result<Self> {
        let Some(path) = std::env::var_os(CONFIG_PATH_ENV) else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(&path).map_err(|e| {
            EngineError::Config(format!(
                "cannot read {} ({}): {}",
                CONFIG_PATH_ENV,
                path.to_string_lossy(),
                e
            ))
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("rows", self.rows), ("columns", self.columns)] {
            if value == 0 || value > MAX_GRID_DIM {
                return Err(EngineError::Config(format!(
                    "{} must be in 1..={}, got {}",
                    name, MAX_GRID_DIM, value
                )));
            }
        }
        if self.min_matches < 2 {
            return Err(EngineError::Config(format!(
                "min_matches must be at least 2, got {}",
                self.min_matches
            )));
        }
        if self.min_matches_for_bonus < self.min_matches {
            return Err(EngineError::Config(format!(
                "min_matches_for_bonus ({}) is below min_matches ({})",
                self.min_matches_for_bonus, self.min_matches
            )));
        }
        if self.kinds.is_empty() {
            return Err(EngineError::Config("kinds must not be empty".to_string()));
        }
        for (i, kind) in self.kinds.iter().enumerate() {
            if self.kinds[..i].contains(kind) {
                return Err(EngineError::Config(format!("duplicate kind: {}", kind)));
            }
        }
        Ok(())
    }

    /// Whether `kind` has a bonus variant
    pub fn has_bonus_variant(&self, kind: TileKind) -> bool {
        self.bonus_kinds.contains(&kind)
    }

    /// Fails with a configuration error when `kind` has no bonus variant.
    pub fn require_bonus_variant(&self, kind: TileKind) -> Result<()> {
        if self.has_bonus_variant(kind) {
            Ok(())
        } else {
            Err(EngineError::Config(format!(
                "no bonus variant configured for kind {}",
                kind
            )))
        }
    }
}
