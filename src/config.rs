//! Reassembly configuration.
//!
//! Mirrors the user-facing settings of the decoders that call into the
//! engine: per-protocol reassembly switches and the eviction policy applied
//! to every store.

use serde::{Deserialize, Serialize};

use crate::reassembly::EvictionConfig;

/// Settings for one reassembly session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReassemblyConfig {
    /// Reassemble segmented CLNP datagrams.
    pub clnp: bool,
    /// Reassemble COTP data units split across TPDUs.
    pub cotp: bool,
    /// Eviction policy for both stores.
    pub eviction: EvictionConfig,
}

impl Default for ReassemblyConfig {
    fn default() -> Self {
        Self {
            clnp: true,
            cotp: true,
            eviction: EvictionConfig::Never,
        }
    }
}
