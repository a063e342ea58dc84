//! Adapter runtime tests - step pacing, sequencing and the event journal

use std::time::Duration;

use serde::Deserialize;
use tokio::sync::mpsc;

use candy_match::adapter::protocol::parse_line;
use candy_match::adapter::{board_hash, CascadeDriver, EventJournal, PresenterMessage};
use candy_match::core::{
    CascadeEvent, CascadeResolver, EngineConfig, PremadeLevel, RandomLevel, SwapOutcome,
};

/// Journal line as an outside reader sees it.
#[derive(Debug, Deserialize)]
struct JournalLine {
    seq: u64,
    ts: u64,
    event: serde_json::Value,
}

fn event_name(event: &CascadeEvent) -> &'static str {
    match event {
        CascadeEvent::Swapped { .. } => "swapped",
        CascadeEvent::SwapReverted { .. } => "swap_reverted",
        CascadeEvent::ScoreChanged { .. } => "score_changed",
        CascadeEvent::TilesRemoved { .. } => "tiles_removed",
        CascadeEvent::BonusCreated { .. } => "bonus_created",
        CascadeEvent::TilesMoved { .. } => "tiles_moved",
        CascadeEvent::CascadeFinished { .. } => "cascade_finished",
    }
}

fn loaded(seed: u32) -> (CascadeResolver, RandomLevel) {
    let config = EngineConfig::default();
    let mut level = RandomLevel::new(seed, &config.kinds).unwrap();
    let mut resolver = CascadeResolver::new(config).unwrap();
    resolver.load(&mut level).unwrap();
    (resolver, level)
}

#[tokio::test]
async fn test_driver_waits_for_each_step() {
    let (resolver, mut level) = loaded(2024);
    let hint = resolver.hint().unwrap();
    let (tx, mut rx) = mpsc::channel(1);

    let presenter = tokio::spawn(async move {
        let mut steps: Vec<Vec<&'static str>> = Vec::new();
        let mut seqs = Vec::new();
        let mut summary = None;
        while let Some(msg) = rx.recv().await {
            match msg {
                PresenterMessage::Step(step) => {
                    assert_eq!(
                        step.envelopes[0].board_hash,
                        board_hash(&step.snapshot)
                    );
                    seqs.extend(step.envelopes.iter().map(|e| e.seq));
                    steps.push(step.envelopes.iter().map(|e| event_name(&e.event)).collect());
                    // Pretend to animate.
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    step.settle();
                }
                PresenterMessage::Finished(s) => summary = Some(s),
            }
        }
        (steps, seqs, summary)
    });

    let mut driver = CascadeDriver::new(resolver, tx);
    let summary = driver
        .drive_swap(hint.first, hint.second, &mut level)
        .await
        .unwrap();
    let last_seq = driver.last_seq();
    let (resolver, _) = driver.into_parts();

    let (steps, seqs, presented) = presenter.await.unwrap();
    assert_eq!(presented, Some(summary));
    assert!(matches!(summary.outcome, SwapOutcome::Accepted { .. }));
    assert_eq!(steps.len() as u32, 1 + summary.iterations);
    assert_eq!(steps[0], ["swapped"]);
    for step in &steps[1..] {
        assert_eq!(step[0], "score_changed");
        assert_eq!(step[1], "tiles_removed");
        assert!(step.contains(&"tiles_moved"));
    }
    assert_eq!(steps.last().unwrap().last(), Some(&"cascade_finished"));

    let expected: Vec<u64> = (1..=last_seq).collect();
    assert_eq!(seqs, expected);
    assert!(resolver.is_idle());
    assert_eq!(resolver.score(), summary.score_delta);
}

#[tokio::test]
async fn test_journal_records_every_published_event() {
    let mut path = std::env::temp_dir();
    path.push(format!("candy-match-driver-{}.jsonl", std::process::id()));
    let _ = std::fs::remove_file(&path);

    let (resolver, mut level) = loaded(7);
    let (tx, mut rx) = mpsc::channel(4);
    let presenter = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let PresenterMessage::Step(step) = msg {
                step.settle();
            }
        }
    });

    let journal = EventJournal::open(&path.to_string_lossy()).await.unwrap();
    let mut driver = CascadeDriver::new(resolver, tx).with_journal(journal);
    for _ in 0..3 {
        let hint = driver.resolver().hint().unwrap();
        driver
            .drive_swap(hint.first, hint.second, &mut level)
            .await
            .unwrap();
    }
    let last_seq = driver.last_seq();
    let (_, journal) = driver.into_parts();
    presenter.await.unwrap();
    assert_eq!(journal.unwrap().close().await.unwrap(), last_seq);

    let text = std::fs::read_to_string(&path).unwrap();
    let envelopes: Vec<_> = text.lines().map(|l| parse_line(l).unwrap()).collect();
    assert_eq!(envelopes.len() as u64, last_seq);
    assert!(envelopes.windows(2).all(|w| w[0].seq < w[1].seq));
    let finished = envelopes
        .iter()
        .filter(|e| matches!(e.event, CascadeEvent::CascadeFinished { .. }))
        .count();
    assert_eq!(finished, 3);

    let raw: Vec<JournalLine> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(raw[0].seq, 1);
    assert!(raw[0].ts > 0);
    assert_eq!(raw[0].event["type"], "swapped");
    assert!(raw[0].event["first"]["kind"].is_string());
    assert_eq!(
        raw.iter()
            .filter(|l| l.event["type"] == "cascade_finished")
            .count(),
        3
    );
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_rejected_swap_publishes_nothing() {
    tokio_test::block_on(async {
        let (resolver, mut level) = loaded(11);
        let a = resolver.grid().id_at(0, 0).unwrap();
        let b = resolver.grid().id_at(5, 5).unwrap();
        let (tx, mut rx) = mpsc::channel(4);

        let mut driver = CascadeDriver::new(resolver, tx);
        let summary = driver.drive_swap(a, b, &mut level).await.unwrap();
        assert_eq!(summary.outcome, SwapOutcome::Rejected);
        assert_eq!(driver.last_seq(), 0);

        drop(driver);
        assert!(rx.recv().await.is_none());
    });
}

#[tokio::test]
async fn test_reverted_swap_publishes_swap_then_revert() {
    let config = EngineConfig {
        rows: 2,
        columns: 3,
        ..EngineConfig::default()
    };
    let refill = RandomLevel::new(1, &config.kinds).unwrap();
    let mut level =
        PremadeLevel::parse("red|blue|green\nyellow|orange|purple\n", 2, 3, refill).unwrap();
    let mut resolver = CascadeResolver::new(config).unwrap();
    resolver.load(&mut level).unwrap();
    let before = resolver.snapshot();
    let a = resolver.grid().id_at(0, 0).unwrap();
    let b = resolver.grid().id_at(0, 1).unwrap();

    let (tx, mut rx) = mpsc::channel(4);
    let presenter = tokio::spawn(async move {
        let mut steps: Vec<Vec<&'static str>> = Vec::new();
        let mut summary = None;
        while let Some(msg) = rx.recv().await {
            match msg {
                PresenterMessage::Step(step) => {
                    steps.push(step.envelopes.iter().map(|e| event_name(&e.event)).collect());
                    step.settle();
                }
                PresenterMessage::Finished(s) => summary = Some(s),
            }
        }
        (steps, summary)
    });

    let mut driver = CascadeDriver::new(resolver, tx);
    let summary = driver.drive_swap(a, b, &mut level).await.unwrap();
    assert_eq!(summary.outcome, SwapOutcome::Reverted);
    assert_eq!(summary.iterations, 0);
    assert_eq!(driver.last_seq(), 2);
    let (resolver, _) = driver.into_parts();

    let (steps, presented) = presenter.await.unwrap();
    assert_eq!(steps, [vec!["swapped"], vec!["swap_reverted"]]);
    assert_eq!(presented, Some(summary));
    assert_eq!(resolver.snapshot(), before);
}
