use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use satrank_engine::run_analysis;

use crate::output::{self, OutputMode};

#[derive(Args, Debug)]
pub struct RoutesArgs {
    /// Path to the network snapshot JSON file.
    #[arg(long)]
    pub snapshot: PathBuf,

    /// Optional TOML run configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory for JSON-lines report files. Prints to stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// The home node id. Falls back to the configured `home_node`.
    #[arg(long)]
    pub home: Option<String>,

    /// Override the number of `(origin, amount)` trials.
    #[arg(long)]
    pub trials: Option<u32>,
}

pub fn run(args: &RoutesArgs, mode: OutputMode) -> Result<()> {
    let (snapshot, mut config) = super::load_inputs(&args.snapshot, args.config.as_deref())?;
    if let Some(home) = &args.home {
        config.home_node = Some(home.clone());
    }
    if config.home_node.is_none() {
        bail!("routes requires a home node: pass --home or set home_node in the config");
    }
    if let Some(trials) = args.trials {
        config.routing.trials = trials;
    }
    // Routing only: clear the buckets so no centrality scenarios run.
    config.buckets.clear();

    let report = run_analysis(&snapshot, &config)?;
    output::emit_report(&report, mode, args.out.as_deref())
}
