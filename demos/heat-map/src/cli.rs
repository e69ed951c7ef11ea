use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Relax a heat map described in INPUT and print a snapshot after every round."
)]
pub struct Cli {
    /// Problem description: grid size, sources, threshold, iterations, cyclic flag
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Give up when threshold mode has not converged after this many passes
    #[arg(long, value_name = "NUM")]
    pub max_passes: Option<usize>,

    /// Give up after this many printed rounds
    #[arg(long, value_name = "NUM")]
    pub max_rounds: Option<usize>,
}
