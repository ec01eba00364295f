//! cellshift demo harness
//!
//! Loads a JSON scenario into an InMemoryRepository and runs the engine on a
//! timer. Each command is printed to stdout as JSON and recorded back into the
//! repository, so the next tick sees the new serving cell.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tokio::time::{Duration, interval};
use tracing_subscriber::EnvFilter;

use cellshift_core::impls::{InMemoryRepository, JsonModelLoader, Scenario};
use cellshift_core::ports::Decider;
use cellshift_core::{EngineBuilder, EngineConfig, HandoverEngine};

#[derive(Parser, Debug)]
#[command(name = "cellshift", about = "Handover decision engine demo harness")]
struct Cli {
    /// Raise log level to debug (ignored when RUST_LOG is set).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the engine against a scenario on a timer.
    Run {
        /// Engine configuration (TOML).
        #[arg(long)]
        config: PathBuf,

        /// Terminal and cell state (JSON).
        #[arg(long)]
        scenario: PathBuf,

        /// Number of invocations. Runs until Ctrl-C when omitted.
        #[arg(long)]
        ticks: Option<u64>,

        /// Time between invocations in milliseconds.
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
    },

    /// Validate configuration and model loading without running.
    Check {
        #[arg(long)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose > 0 { "cellshift=debug" } else { "cellshift=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Command::Run {
            config,
            scenario,
            ticks,
            interval_ms,
        } => run(&config, &scenario, ticks, interval_ms).await,
        Command::Check { config } => check(&config),
    }
}

fn load_config(path: &Path) -> anyhow::Result<EngineConfig> {
    EngineConfig::from_file(path).with_context(|| format!("loading config {}", path.display()))
}

fn check(config_path: &Path) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let builder = EngineBuilder::from_config(&config, &JsonModelLoader)?;
    // build() needs a repository; an empty one is enough to check the wiring
    builder
        .repository(Arc::new(InMemoryRepository::new()))
        .build()?;

    tracing::info!(
        strategy = ?config.strategy,
        decode = ?config.decode,
        "configuration ok"
    );
    println!("{}", config.to_toml()?);
    Ok(())
}

async fn run(
    config_path: &Path,
    scenario_path: &Path,
    ticks: Option<u64>,
    interval_ms: u64,
) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let json = std::fs::read_to_string(scenario_path)
        .with_context(|| format!("reading scenario {}", scenario_path.display()))?;
    let scenario = Scenario::from_json(&json)
        .with_context(|| format!("parsing scenario {}", scenario_path.display()))?;
    let repo = Arc::new(InMemoryRepository::from_scenario(scenario, Utc::now()));

    let engine = EngineBuilder::from_config(&config, &JsonModelLoader)?
        .repository(repo.clone())
        .build()?;

    tracing::info!(
        strategy = engine.decider().name(),
        ticks = ?ticks,
        interval_ms,
        "cellshift starting"
    );

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    let done = drive(
        &engine,
        &repo,
        ticks,
        Duration::from_millis(interval_ms.max(1)),
        shutdown,
    )
    .await?;

    tracing::info!(ticks = done, "cellshift stopped");
    Ok(())
}

/// Ticks until `ticks` invocations ran or `shutdown` resolves.
///
/// `shutdown` is polled across the whole loop. A signal that arrives while a
/// tick is running stops the loop before the next one; the running tick is
/// never cut short.
async fn drive<S>(
    engine: &HandoverEngine,
    repo: &InMemoryRepository,
    ticks: Option<u64>,
    every: Duration,
    shutdown: S,
) -> anyhow::Result<u64>
where
    S: Future<Output = ()>,
{
    let mut timer = interval(every);
    tokio::pin!(shutdown);
    let mut done = 0u64;
    while ticks.is_none_or(|n| done < n) {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                tracing::info!("interrupted");
                break;
            }
            _ = timer.tick() => {}
        }
        tick(engine, repo).await?;
        done += 1;
    }
    Ok(done)
}

/// One invocation. Recoverable errors are retried on the next tick.
async fn tick(engine: &HandoverEngine, repo: &InMemoryRepository) -> anyhow::Result<()> {
    let output = match engine.run_with_report().await {
        Ok(output) => output,
        Err(e) if e.is_recoverable() => {
            tracing::warn!(error = %e, "run failed, retrying next tick");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    for cmd in &output.commands {
        println!("{}", serde_json::to_string(cmd)?);
        if !repo.record_handover(cmd).await {
            tracing::warn!(terminal = %cmd.terminal, "terminal vanished before handover was recorded");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellshift_core::deciders::DistanceDecider;
    use cellshift_core::domain::{CellId, TerminalNodeId};
    use cellshift_core::ports::DataRepository;
    use std::task::Poll;

    const SCENARIO: &str = r#"{
        "terminals": [
            { "node_id": 1, "serving_cell": 1, "rnti": 1, "position": { "x": 0.0, "y": 0.0, "z": 0.0 } }
        ],
        "cells": [
            { "node_id": 10, "cell_id": 1, "position": { "x": 100.0, "y": 0.0, "z": 0.0 } },
            { "node_id": 20, "cell_id": 2, "position": { "x": 1.0, "y": 0.0, "z": 0.0 } }
        ]
    }"#;

    fn fixture() -> (HandoverEngine, Arc<InMemoryRepository>) {
        let scenario = Scenario::from_json(SCENARIO).unwrap();
        let repo = Arc::new(InMemoryRepository::from_scenario(scenario, Utc::now()));
        let engine = EngineBuilder::new()
            .repository(repo.clone())
            .decider(Box::new(DistanceDecider::new()))
            .build()
            .unwrap();
        (engine, repo)
    }

    #[tokio::test]
    async fn runs_requested_ticks_and_records_handovers() {
        let (engine, repo) = fixture();

        let done = drive(
            &engine,
            &repo,
            Some(3),
            Duration::from_millis(1),
            std::future::pending(),
        )
        .await
        .unwrap();

        assert_eq!(done, 3);
        let state = repo.terminal_state(TerminalNodeId::new(1)).await.unwrap();
        assert_eq!(state.serving_cell, Some(CellId(2)));
    }

    #[tokio::test]
    async fn shutdown_raised_during_a_tick_stops_before_the_next() {
        let (engine, repo) = fixture();
        // pending on the first poll, ready on every later one
        let mut polled = false;
        let shutdown = std::future::poll_fn(move |cx| {
            if polled {
                Poll::Ready(())
            } else {
                polled = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        });

        let done = drive(&engine, &repo, None, Duration::from_millis(1), shutdown)
            .await
            .unwrap();

        assert_eq!(done, 1);
    }
}
