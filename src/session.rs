//! Session-scoped ownership of both reassembly front ends.
//!
//! A session corresponds to one opened capture. Starting a new one discards
//! every store and the implicit connection counter together, so no state
//! leaks between unrelated captures.

use log::debug;

use crate::{clnp::ClnpReassembly, config::ReassemblyConfig, cotp::CotpReassembly};

/// Reassembly state for one processing session.
///
/// # Examples
///
/// ```
/// use osi_reassembly::{ReassemblyConfig, ReassemblySession};
///
/// let mut session = ReassemblySession::new(ReassemblyConfig::default());
/// session.start();
/// assert!(session.clnp().reassembler().store().is_empty());
/// ```
#[derive(Debug)]
pub struct ReassemblySession {
    config: ReassemblyConfig,
    clnp: ClnpReassembly,
    cotp: CotpReassembly,
}

impl ReassemblySession {
    /// Create a session from `config`.
    #[must_use]
    pub fn new(config: ReassemblyConfig) -> Self {
        Self {
            config,
            clnp: ClnpReassembly::new(config.clnp, config.eviction),
            cotp: CotpReassembly::new(config.cotp, config.eviction),
        }
    }

    /// Configuration the session was built from.
    #[must_use]
    pub const fn config(&self) -> &ReassemblyConfig { &self.config }

    /// Begin a new session, discarding all reassembly state. Idempotent.
    pub fn start(&mut self) {
        self.clnp.reset();
        self.cotp.reset();
        debug!("reassembly session started");
    }

    /// Network-layer front end.
    #[must_use]
    pub const fn clnp(&self) -> &ClnpReassembly { &self.clnp }

    /// Mutable network-layer front end.
    pub fn clnp_mut(&mut self) -> &mut ClnpReassembly { &mut self.clnp }

    /// Transport-layer front end.
    #[must_use]
    pub const fn cotp(&self) -> &CotpReassembly { &self.cotp }

    /// Mutable transport-layer front end.
    pub fn cotp_mut(&mut self) -> &mut CotpReassembly { &mut self.cotp }
}
