use clap::{Args, Parser, Subcommand};

/// Battery pack diagnostics from the terminal.
///
/// Runs simulated scans, manages the local scan history and asks the
/// Gemini-backed advisor how to repair a flagged cell.
#[derive(Parser, Debug)]
#[command(name = "cellscope", version, about = "EV battery pack diagnostics")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Stream simulated snapshots and diagnose each one
    Scan(ScanArgs),
    /// Inspect or clear stored scans
    #[command(subcommand)]
    History(HistoryCommand),
    /// Ask the advisor about one cell of a stored scan
    Suggest(SuggestArgs),
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Number of snapshots to take (0 runs until Ctrl+C)
    #[arg(long, default_value = "1")]
    pub count: u32,

    /// Delay between snapshots in milliseconds (default: TELEMETRY_INTERVAL_MS)
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Seed for reproducible telemetry and clustering
    #[arg(long, env = "TELEMETRY_SEED")]
    pub seed: Option<u64>,

    /// Vehicle the pack belongs to
    #[arg(long, default_value = cellscope_ingest::DEFAULT_VEHICLE)]
    pub vehicle: String,

    /// Save the last snapshot to history
    #[arg(long)]
    pub save: bool,

    /// Print each report as JSON
    #[arg(long)]
    pub json: bool,

    /// Refine each snapshot's state of health with a quick re-measure
    #[arg(long)]
    pub quick: bool,
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    /// List stored scans, newest first
    List {
        /// Print the raw history JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete all stored scans
    Clear,
}

#[derive(Args, Debug)]
pub struct SuggestArgs {
    /// Cell id to ask about
    #[arg(long)]
    pub cell: u32,

    /// History position, 0 = newest
    #[arg(long, default_value = "0")]
    pub index: usize,
}
