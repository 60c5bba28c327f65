use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use satrank_engine::run_analysis;

use crate::output::{self, OutputMode};

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Path to the network snapshot JSON file.
    #[arg(long)]
    pub snapshot: PathBuf,

    /// Optional TOML run configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory for JSON-lines report files. Prints to stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Override the configured home node id.
    #[arg(long)]
    pub home: Option<String>,
}

pub fn run(args: &AnalyzeArgs, mode: OutputMode) -> Result<()> {
    let (snapshot, mut config) = super::load_inputs(&args.snapshot, args.config.as_deref())?;
    if let Some(home) = &args.home {
        config.home_node = Some(home.clone());
    }

    let report = run_analysis(&snapshot, &config)?;
    output::emit_report(&report, mode, args.out.as_deref())
}
