mod cli;
mod logging;

use crate::cli::Cli;
use anyhow::{Context, Result};
use clap::Parser;
use heatmap::d2::heat_eqn;
use heatmap::input;
use heatmap::session::Session;
use std::io::{self, BufWriter, Write};
use tracing::{debug, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())
        .context("failed to set up logging")?;

    info!("heat-map v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let mut problem = input::read_file(&cli.input)
        .with_context(|| format!("failed to read '{}'", cli.input.display()))?;

    let mut session = Session::for_problem(heat_eqn, &problem);
    if let Some(max_passes) = cli.max_passes {
        session = session.with_max_passes(max_passes);
    }
    if let Some(max_rounds) = cli.max_rounds {
        session = session.with_max_rounds(max_rounds);
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let rounds = session.write_to(&mut problem.grid, &problem.sources, &mut out)?;
    out.flush()?;

    info!(rounds, "relaxation complete");
    Ok(())
}
