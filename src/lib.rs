#![doc(html_root_url = "https://docs.rs/osi_reassembly/latest")]
//! Public API for the `osi_reassembly` library.
//!
//! This crate provides the segment and fragment reassembly engine used by
//! OSI network- and transport-layer decoders: a session-scoped keyed store,
//! gap and anomaly analysis, offset-driven and arrival-driven reassembly
//! disciplines, and the CLNP and COTP boundaries that feed them.

pub mod clnp;
pub mod config;
pub mod cotp;
pub mod disposition;
pub mod metrics;
pub mod reassembly;
pub mod replay;
pub mod session;

pub use clnp::{ChecksumStatus, ClnpReassembly, ClnpSegment};
pub use config::ReassemblyConfig;
pub use cotp::{CotpDataUnit, CotpReassembly};
pub use disposition::Disposition;
pub use reassembly::{
    EndpointAddress,
    EvictionConfig,
    Fragment,
    FragmentKey,
    FrameId,
    OffsetReassembler,
    Outcome,
    Reason,
    ReassembledMessage,
    SequenceReassembler,
};
pub use replay::{ReplayError, ReplayRecord, replay};
pub use session::ReassemblySession;
