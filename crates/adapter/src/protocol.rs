//! Protocol module - JSON records for the event journal and presenters
//!
//! One [`EventEnvelope`] per line. Every envelope carries a strictly
//! increasing `seq`, a wall-clock `ts` in milliseconds, and a stable hash of
//! the board as it stood once the event's step had run.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::core::{BoardSnapshot, CascadeEvent};

/// Stable 64-bit FNV-1a hasher for deterministic `board_hash`.
///
/// `DefaultHasher` output is not guaranteed stable across Rust versions.
#[derive(Debug, Clone)]
struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

/// Hash of the board layout and score (phase and move count excluded)
pub fn board_hash(snapshot: &BoardSnapshot) -> u64 {
    let mut hasher = Fnv1aHasher::new();
    snapshot.rows.hash(&mut hasher);
    snapshot.columns.hash(&mut hasher);
    snapshot.cells.hash(&mut hasher);
    snapshot.score.hash(&mut hasher);
    hasher.finish()
}

/// One journal line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub seq: u64,
    pub ts: u64,
    pub board_hash: u64,
    pub event: CascadeEvent,
}

/// Hands out envelopes with increasing sequence numbers
#[derive(Debug, Clone, Default)]
pub struct Sequencer {
    next: u64,
}

impl Sequencer {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Last sequence number handed out (0 before the first)
    pub fn last(&self) -> u64 {
        self.next.saturating_sub(1)
    }

    pub fn wrap(&mut self, snapshot: &BoardSnapshot, events: Vec<CascadeEvent>) -> Vec<EventEnvelope> {
        let board_hash = board_hash(snapshot);
        let ts = current_timestamp_ms();
        events
            .into_iter()
            .map(|event| {
                let seq = self.next.max(1);
                self.next = seq + 1;
                EventEnvelope {
                    seq,
                    ts,
                    board_hash,
                    event,
                }
            })
            .collect()
    }
}

/// Serialise one envelope as a journal line (no trailing newline)
pub fn encode_line(envelope: &EventEnvelope) -> serde_json::Result<String> {
    serde_json::to_string(envelope)
}

pub fn parse_line(line: &str) -> serde_json::Result<EventEnvelope> {
    serde_json::from_str(line.trim())
}

/// Get current timestamp in milliseconds
fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
