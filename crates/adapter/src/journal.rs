//! Event journal - append-only JSONL log of cascade events
//!
//! Writes happen on a background tokio task fed by an unbounded channel, so
//! recording never blocks the caller. A write failure stops the writer;
//! later records are dropped and surface as an error from
//! [`EventJournal::close`].

use anyhow::{anyhow, Context};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::protocol::{encode_line, EventEnvelope};

/// Environment variable naming the journal file
pub const LOG_PATH_ENV: &str = "CANDY_MATCH_LOG_PATH";

pub struct EventJournal {
    tx: mpsc::UnboundedSender<EventEnvelope>,
    writer: JoinHandle<anyhow::Result<u64>>,
}

impl EventJournal {
    /// Journal path from `CANDY_MATCH_LOG_PATH`; blank counts as unset.
    pub fn path_from_env() -> Option<String> {
        std::env::var(LOG_PATH_ENV)
            .ok()
            .map(|s| s.trim().to_string())
            .and_then(|s| if s.is_empty() { None } else { Some(s) })
    }

    /// Open the journal named by the environment, if any
    pub async fn from_env() -> anyhow::Result<Option<Self>> {
        match Self::path_from_env() {
            Some(path) => Ok(Some(Self::open(&path).await?)),
            None => Ok(None),
        }
    }

    /// Open (or create) `path` for appending and start the writer task.
    pub async fn open(path: &str) -> anyhow::Result<Self> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .with_context(|| format!("opening event journal {}", path))?;

        let (tx, mut rx) = mpsc::unbounded_channel::<EventEnvelope>();
        let writer = tokio::spawn(async move {
            let mut written = 0u64;
            let mut buf: Vec<u8> = Vec::with_capacity(4096);

            while let Some(envelope) = rx.recv().await {
                buf.clear();
                let line = encode_line(&envelope).context("encoding journal record")?;
                buf.extend_from_slice(line.as_bytes());
                buf.push(b'\n');
                file.write_all(&buf).await.context("writing event journal")?;
                written += 1;
            }

            file.flush().await.context("flushing event journal")?;
            Ok::<u64, anyhow::Error>(written)
        });

        Ok(Self { tx, writer })
    }

    /// Queue envelopes for writing. Returns false once the writer has stopped.
    pub fn record(&self, envelopes: &[EventEnvelope]) -> bool {
        envelopes
            .iter()
            .all(|envelope| self.tx.send(envelope.clone()).is_ok())
    }

    /// Flush everything queued so far and stop the writer.
    ///
    /// Returns the number of lines written.
    pub async fn close(self) -> anyhow::Result<u64> {
        drop(self.tx);
        self.writer
            .await
            .map_err(|e| anyhow!("event journal writer panicked: {}", e))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BoardSnapshot, CascadeEvent, CascadePhase, Grid};
    use crate::protocol::{parse_line, Sequencer};

    fn temp_path(name: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("candy-match-{}-{}.jsonl", name, std::process::id()));
        let _ = std::fs::remove_file(&path);
        path
    }

    #[tokio::test]
    async fn test_journal_appends_one_line_per_event() {
        let path = temp_path("journal-append");
        let path_str = path.to_string_lossy().to_string();
        let snap = BoardSnapshot::from_grid(&Grid::new(2, 2), CascadePhase::Idle, 0, 0);
        let mut seq = Sequencer::new();

        let journal = EventJournal::open(&path_str).await.unwrap();
        let batch = seq.wrap(
            &snap,
            vec![
                CascadeEvent::ScoreChanged {
                    iteration: 1,
                    delta: 60,
                    total: 60,
                },
                CascadeEvent::CascadeFinished {
                    iterations: 1,
                    score_delta: 60,
                },
            ],
        );
        assert!(journal.record(&batch));
        assert_eq!(journal.close().await.unwrap(), 2);

        // Reopening appends after the existing lines.
        let journal = EventJournal::open(&path_str).await.unwrap();
        assert!(journal.record(&batch[..1]));
        assert_eq!(journal.close().await.unwrap(), 1);

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<EventEnvelope> = text.lines().map(|l| parse_line(l).unwrap()).collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], batch[0]);
        assert_eq!(lines[1], batch[1]);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_open_reports_bad_path() {
        let mut path = temp_path("no-such-dir");
        path.push("journal.jsonl");
        let err = EventJournal::open(&path.to_string_lossy()).await.err().unwrap();
        assert!(err.to_string().contains("opening event journal"));
    }
}
