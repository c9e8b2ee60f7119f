//! Command line interface for the trace replay binary.

use std::{
    num::{NonZeroU32, NonZeroUsize},
    path::PathBuf,
};

use clap::Parser;

/// Command line arguments for the `osi-reassembly` binary.
#[derive(Debug, Parser)]
#[command(
    name = "osi-reassembly",
    version,
    about = "Replay a CLNP/COTP unit trace through the reassembly engine"
)]
pub struct Cli {
    /// Trace file to replay.
    pub trace: PathBuf,
    /// Do not reassemble segmented CLNP datagrams.
    #[arg(long)]
    pub no_clnp_reassembly: bool,
    /// Do not reassemble COTP data units.
    #[arg(long)]
    pub no_cotp_reassembly: bool,
    /// Keep at most this many reassemblies per protocol.
    #[arg(long, conflicts_with = "max_age_frames")]
    pub max_entries: Option<NonZeroUsize>,
    /// Drop reassemblies idle for more than this many frames.
    #[arg(long)]
    pub max_age_frames: Option<NonZeroU32>,
}
