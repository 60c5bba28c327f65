#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{Parser, Subcommand};
use output::OutputMode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "satrank: fee-weighted payment-graph analytics",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags.
    fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Run centrality and routing-competition analysis",
        after_help = "EXAMPLES:\n    satrank analyze --snapshot gossip.json --config satrank.toml --out reports/"
    )]
    Analyze(cmd::analyze::AnalyzeArgs),

    #[command(about = "Rank nodes and channels by fee-weighted betweenness")]
    Centrality(cmd::centrality::CentralityArgs),

    #[command(about = "Compare routing through the home node against the best detour")]
    Routes(cmd::routes::RoutesArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mode = cli.output_mode();
    match &cli.command {
        Commands::Analyze(args) => cmd::analyze::run(args, mode),
        Commands::Centrality(args) => cmd::centrality::run(args, mode),
        Commands::Routes(args) => cmd::routes::run(args, mode),
    }
}

/// Logs go to stderr so stdout stays parseable in `--json` mode.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
