use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rhythm")]
#[command(about = "Captures build output statistics and keeps a downsampled history")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Capture a point from the output folder and update the history
    Run(RunArgs),

    /// List the stored history
    History(HistoryArgs),

    /// Re-apply retention to the stored history
    Prune(PruneArgs),

    /// Compare the two most recent points
    Diff(DiffArgs),
}

#[derive(Args, Clone, Debug, Default)]
pub struct ConfigArgs {
    /// Config file (defaults to ./rhythm.toml, then the user config dir)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
}

#[derive(Parser)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Output folder of the stats generator
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Extension of the metrics documents
    #[arg(long)]
    pub extension: Option<String>,
}

#[derive(Parser)]
pub struct HistoryArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct PruneArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Evaluate retention as of this time instead of now ("2026-11-01 12:00:00", UTC)
    #[arg(long)]
    pub at: Option<String>,

    /// Only report what would be removed
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct DiffArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}
