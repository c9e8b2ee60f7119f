//! Replay binary for `osi_reassembly`.
//!
//! Reads a unit trace and prints the reassembly disposition of each unit.

mod cli;

use std::{fs::File, io::BufReader, process::ExitCode};

use clap::Parser;
use osi_reassembly::{EvictionConfig, ReassemblyConfig, ReassemblySession, replay};

fn config_from(cli: &cli::Cli) -> ReassemblyConfig {
    let eviction = match (cli.max_entries, cli.max_age_frames) {
        (Some(max_entries), _) => EvictionConfig::Capacity(max_entries),
        (None, Some(max_age)) => EvictionConfig::FrameAge(max_age),
        (None, None) => EvictionConfig::Never,
    };
    ReassemblyConfig {
        clnp: !cli.no_clnp_reassembly,
        cotp: !cli.no_cotp_reassembly,
        eviction,
    }
}

fn main() -> ExitCode {
    // Library code logs through `log`; the fmt subscriber picks those records up.
    tracing_subscriber::fmt::init();

    let cli = cli::Cli::parse();
    let mut session = ReassemblySession::new(config_from(&cli));
    session.start();

    let file = match File::open(&cli.trace) {
        Ok(file) => file,
        Err(err) => {
            tracing::error!(error = %err, path = %cli.trace.display(), "cannot open trace");
            return ExitCode::FAILURE;
        }
    };

    match replay(&mut session, BufReader::new(file)) {
        Ok(records) => {
            for record in &records {
                println!("{record}");
            }
            tracing::info!(units = records.len(), "trace replayed");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "trace replay failed");
            ExitCode::FAILURE
        }
    }
}
