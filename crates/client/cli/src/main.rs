//! Command-line entry point: loads content, runs a scripted session against
//! the progression runtime and prints the resulting actor sheets.
mod config;
mod session;

use std::collections::BTreeMap;

use anyhow::Result;
use config::CliConfig;
use runtime::{Event, ProgressionRuntime, RuntimeConfig, Topic};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = CliConfig::from_env();
    let content = config.load_content()?;

    let mut runtime = ProgressionRuntime::builder()
        .config(RuntimeConfig {
            event_buffer_size: config.event_buffer,
            ..RuntimeConfig::default()
        })
        .content(content)
        .build()?;

    let watcher = tokio::spawn(watch_events(
        runtime.subscribe(Topic::Progression),
        runtime.subscribe(Topic::Stats),
        runtime.subscribe(Topic::Cast),
    ));

    let report = session::run(&mut runtime, &config)?;
    // Dropping the runtime closes every topic, which ends the watcher.
    drop(runtime);

    let counts = watcher.await?;
    tracing::info!(?counts, "session finished");
    print!("{report}");
    Ok(())
}

/// Logs every published event and returns how many arrived per topic.
async fn watch_events(
    mut progression: broadcast::Receiver<Event>,
    mut stats: broadcast::Receiver<Event>,
    mut cast: broadcast::Receiver<Event>,
) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    let mut open = [true; 3];

    while open.iter().any(|o| *o) {
        let (index, topic, received) = tokio::select! {
            received = progression.recv(), if open[0] => (0, "progression", received),
            received = stats.recv(), if open[1] => (1, "stats", received),
            received = cast.recv(), if open[2] => (2, "cast", received),
        };
        match received {
            Ok(event) => {
                tracing::debug!(topic, ?event, "event");
                *counts.entry(topic).or_insert(0) += 1;
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(topic, skipped, "event watcher lagged");
            }
            Err(RecvError::Closed) => open[index] = false,
        }
    }
    counts
}
