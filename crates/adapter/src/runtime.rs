//! Presentation runtime.
//!
//! Bridges the synchronous cascade state machine with an async presenter.
//! Every step's events go out as one [`PresenterStep`]; the driver waits for
//! the presenter to settle it (animations done) before running the next step.

use anyhow::anyhow;
use tokio::sync::{mpsc, oneshot};

use crate::core::{
    BoardSnapshot, CascadeResolver, CascadeSummary, LevelSource, SwapOutcome, SwapRequest, TileId,
};
use crate::journal::EventJournal;
use crate::protocol::{EventEnvelope, Sequencer};

/// Events of one step, plus the handle that lets the driver continue.
#[derive(Debug)]
pub struct PresenterStep {
    pub envelopes: Vec<EventEnvelope>,
    /// Board after the step.
    pub snapshot: BoardSnapshot,
    settle: oneshot::Sender<()>,
}

impl PresenterStep {
    /// Signal that this step has been presented.
    pub fn settle(self) {
        let _ = self.settle.send(());
    }
}

/// Message delivered to the presenter task.
#[derive(Debug)]
pub enum PresenterMessage {
    Step(PresenterStep),
    /// The swap is fully resolved; no settle needed.
    Finished(CascadeSummary),
}

/// Runs swaps step by step, pacing them by the presenter.
pub struct CascadeDriver {
    resolver: CascadeResolver,
    sequencer: Sequencer,
    journal: Option<EventJournal>,
    presenter: mpsc::Sender<PresenterMessage>,
}

impl CascadeDriver {
    pub fn new(resolver: CascadeResolver, presenter: mpsc::Sender<PresenterMessage>) -> Self {
        Self {
            resolver,
            sequencer: Sequencer::new(),
            journal: None,
            presenter,
        }
    }

    /// Also append every published event to `journal`.
    pub fn with_journal(mut self, journal: EventJournal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn resolver(&self) -> &CascadeResolver {
        &self.resolver
    }

    /// Last sequence number published
    pub fn last_seq(&self) -> u64 {
        self.sequencer.last()
    }

    /// Stop driving; dropping the presenter sender ends its receive loop.
    pub fn into_parts(self) -> (CascadeResolver, Option<EventJournal>) {
        (self.resolver, self.journal)
    }

    /// Swap two tiles and resolve the cascade, one presented step at a time.
    ///
    /// Fails if the presenter goes away or drops a step without settling it;
    /// the resolver is then left wherever the swap had got to.
    pub async fn drive_swap(
        &mut self,
        first: TileId,
        second: TileId,
        source: &mut dyn LevelSource,
    ) -> anyhow::Result<CascadeSummary> {
        let mut summary = CascadeSummary {
            outcome: SwapOutcome::Rejected,
            iterations: 0,
            score_delta: 0,
        };

        if self.resolver.request_swap(first, second)? == SwapRequest::Rejected {
            return Ok(summary);
        }
        self.publish().await?;

        summary.outcome = self.resolver.settle_swap()?;
        if summary.outcome == SwapOutcome::Reverted {
            self.publish().await?;
        }

        if let SwapOutcome::Accepted { .. } = summary.outcome {
            loop {
                let step = self.resolver.resolve_one_iteration(source)?;
                summary.iterations = step.iteration;
                summary.score_delta += u64::from(step.score_delta);
                self.publish().await?;
                if step.finished {
                    break;
                }
            }
        }

        self.presenter
            .send(PresenterMessage::Finished(summary))
            .await
            .map_err(|_| anyhow!("presenter closed"))?;
        Ok(summary)
    }

    async fn publish(&mut self) -> anyhow::Result<()> {
        let events = self.resolver.take_events();
        if events.is_empty() {
            return Ok(());
        }
        let snapshot = self.resolver.snapshot();
        let envelopes = self.sequencer.wrap(&snapshot, events);
        if let Some(journal) = self.journal.as_ref() {
            if !journal.record(&envelopes) {
                return Err(anyhow!("event journal writer stopped"));
            }
        }

        let seq = self.sequencer.last();
        let (settle, settled) = oneshot::channel();
        self.presenter
            .send(PresenterMessage::Step(PresenterStep {
                envelopes,
                snapshot,
                settle,
            }))
            .await
            .map_err(|_| anyhow!("presenter closed"))?;
        settled
            .await
            .map_err(|_| anyhow!("presenter dropped step {} without settling", seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EngineConfig, RandomLevel};

    fn driver(tx: mpsc::Sender<PresenterMessage>) -> (CascadeDriver, RandomLevel) {
        let config = EngineConfig::default();
        let mut level = RandomLevel::new(99, &config.kinds).unwrap();
        let mut resolver = CascadeResolver::new(config).unwrap();
        resolver.load(&mut level).unwrap();
        (CascadeDriver::new(resolver, tx), level)
    }

    #[tokio::test]
    async fn test_closed_presenter_is_an_error() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let (mut driver, mut level) = driver(tx);
        let hint = driver.resolver().hint().unwrap();

        let err = driver
            .drive_swap(hint.first, hint.second, &mut level)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("presenter closed"));
    }

    #[tokio::test]
    async fn test_unsettled_step_is_an_error() {
        let (tx, mut rx) = mpsc::channel(1);
        let presenter = tokio::spawn(async move {
            // Drop every step without settling it.
            while let Some(msg) = rx.recv().await {
                drop(msg);
            }
        });
        let (mut driver, mut level) = driver(tx);
        let hint = driver.resolver().hint().unwrap();

        let err = driver
            .drive_swap(hint.first, hint.second, &mut level)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("without settling"));
        drop(driver);
        presenter.await.unwrap();
    }
}
