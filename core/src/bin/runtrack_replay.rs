// core/src/bin/runtrack_replay.rs
use std::io;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use runtrack_core::{
    load_config, load_event_log, load_profile, replay_events, JsonDirStore, RunStore,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Replay a recorded sensor log through the run tracker", long_about = None)]
struct Cli {
    /// JSON array of sensor events (position / position_error / motion / tick)
    log: PathBuf,

    /// Tracker config JSON (missing file => defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Runner profile JSON (missing file => default mass)
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Save the finished run into this directory (one JSON file per run)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Run id used with --store (defaults to the log file stem)
    #[arg(long)]
    id: Option<String>,

    /// Print the session's Prometheus counters to stderr
    #[arg(long, action = ArgAction::SetTrue)]
    metrics: bool,

    /// Debug-level logging (per rejected fix and per step)
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let cfg = match &cli.config {
        Some(p) => load_config(p).with_context(|| format!("config {}", p.display()))?,
        None => Default::default(),
    };
    let profile = match &cli.profile {
        Some(p) => load_profile(p).with_context(|| format!("profile {}", p.display()))?,
        None => Default::default(),
    };
    let events = load_event_log(&cli.log).with_context(|| format!("event log {}", cli.log.display()))?;

    let save_cfg = cfg.session.clone();
    let outcome = replay_events(&events, profile, cfg)?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    if cli.metrics {
        if let Some(txt) = &outcome.metrics {
            eprint!("{txt}");
        }
    }

    if let Some(dir) = &cli.store {
        let id = match &cli.id {
            Some(id) => id.clone(),
            None => cli
                .log
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_owned)
                .ok_or_else(|| anyhow!("cannot derive run id from {}", cli.log.display()))?,
        };
        let mut store = JsonDirStore::open(dir)?;
        store
            .save(&id, &outcome.summary, &save_cfg)
            .with_context(|| format!("saving run {id}"))?;
    }
    Ok(())
}
