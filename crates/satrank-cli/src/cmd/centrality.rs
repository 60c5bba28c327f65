use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use satrank_engine::run_analysis;

use crate::output::{self, OutputMode};

#[derive(Args, Debug)]
pub struct CentralityArgs {
    /// Path to the network snapshot JSON file.
    #[arg(long)]
    pub snapshot: PathBuf,

    /// Optional TOML run configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory for JSON-lines report files. Prints to stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Restrict each scenario to a bounded neighborhood of this node.
    #[arg(long)]
    pub local: Option<String>,
}

pub fn run(args: &CentralityArgs, mode: OutputMode) -> Result<()> {
    let (snapshot, mut config) = super::load_inputs(&args.snapshot, args.config.as_deref())?;
    // Centrality only: no home node means the routing pipeline is skipped.
    config.home_node = None;
    if let Some(start) = &args.local {
        let mut local = config.local.take().unwrap_or_default();
        local.start = Some(start.clone());
        config.local = Some(local);
    }

    let report = run_analysis(&snapshot, &config)?;
    output::emit_report(&report, mode, args.out.as_deref())
}
