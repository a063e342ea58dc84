//! Headless autoplay runner (default binary).
//!
//! Loads a level, then repeatedly plays the first hinted swap through the
//! async cascade driver until the move budget runs out or the board is stuck.
//!
//! ```text
//! candy-match [--seed N] [--moves N] [--level PATH]
//! ```
//!
//! `CANDY_MATCH_CONFIG` names a JSON engine config; `CANDY_MATCH_LOG_PATH`
//! turns on the JSONL event journal.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use tokio::sync::mpsc;

use candy_match::adapter::{CascadeDriver, EventJournal, PresenterMessage};
use candy_match::core::{CascadeResolver, EngineConfig, LevelSource, PremadeLevel, RandomLevel};

#[derive(Debug)]
struct Cli {
    seed: u32,
    moves: u32,
    level: Option<PathBuf>,
    help: bool,
}

const USAGE: &str = "usage: candy-match [--seed N] [--moves N] [--level PATH]";

fn parse_args() -> Result<Cli> {
    let mut cli = Cli {
        seed: 1,
        moves: 20,
        level: None,
        help: false,
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => cli.help = true,
            "--seed" => {
                let value = args.next().ok_or_else(|| anyhow!("--seed requires a value"))?;
                cli.seed = value
                    .parse()
                    .with_context(|| format!("invalid --seed: {}", value))?;
            }
            "--moves" => {
                let value = args.next().ok_or_else(|| anyhow!("--moves requires a value"))?;
                cli.moves = value
                    .parse()
                    .with_context(|| format!("invalid --moves: {}", value))?;
            }
            "--level" => {
                let path = args.next().ok_or_else(|| anyhow!("--level requires a path"))?;
                cli.level = Some(PathBuf::from(path));
            }
            other => return Err(anyhow!("unknown argument: {} ({})", other, USAGE)),
        }
    }
    Ok(cli)
}

fn level_source(cli: &Cli, config: &EngineConfig) -> Result<Box<dyn LevelSource>> {
    let random = RandomLevel::new(cli.seed, &config.kinds)?;
    match cli.level.as_ref() {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading level {}", path.display()))?;
            let level = PremadeLevel::parse(&text, config.rows, config.columns, random)
                .with_context(|| format!("parsing level {}", path.display()))?;
            Ok(Box::new(level))
        }
        None => Ok(Box::new(random)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = parse_args()?;
    if cli.help {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = EngineConfig::from_env()?;
    let mut source = level_source(&cli, &config)?;
    let mut resolver = CascadeResolver::new(config)?;
    resolver.load(source.as_mut())?;
    println!("{}", resolver.grid());

    // Headless presenter: settle every step immediately.
    let (tx, mut rx) = mpsc::channel::<PresenterMessage>(8);
    let presenter = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let PresenterMessage::Step(step) = msg {
                step.settle();
            }
        }
    });

    let mut driver = CascadeDriver::new(resolver, tx);
    if let Some(journal) = EventJournal::from_env().await? {
        driver = driver.with_journal(journal);
    }

    for turn in 1..=cli.moves {
        let Some(hint) = driver.resolver().hint() else {
            println!("no moves left after {} turns", turn - 1);
            break;
        };
        let summary = driver.drive_swap(hint.first, hint.second, source.as_mut()).await?;
        println!(
            "turn {:>3}: {:?}, {} iteration(s), +{} (score {})",
            turn,
            summary.outcome,
            summary.iterations,
            summary.score_delta,
            driver.resolver().score()
        );
    }

    let (resolver, journal) = driver.into_parts();
    presenter.await?;
    if let Some(journal) = journal {
        let written = journal.close().await?;
        println!("journal: {} events", written);
    }

    println!("{}", resolver.grid());
    println!("final score {} in {} moves", resolver.score(), resolver.moves());
    Ok(())
}
