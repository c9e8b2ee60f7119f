//! Transport-layer boundary: COTP data units into the sequence reassembler.
//!
//! Classes 2 to 4 name the connection with a destination reference that
//! every message on the connection repeats; the key also carries the
//! reference's message generation, bumped on each completion. Classes 0 and
//! 1 carry no reference, so the sequence discipline's key synthesizer stands
//! in for one, advancing each time a message completes.

use bytes::Bytes;
use log::debug;

use crate::{
    disposition::Disposition,
    reassembly::{
        EndpointAddress,
        EvictionConfig,
        Fragment,
        FragmentKey,
        FrameId,
        KeySynthesizer,
        SequenceDiscipline,
        SequenceReassembler,
    },
};

/// Decoded fields of one COTP data unit relevant to reassembly.
#[derive(Clone, Debug)]
pub struct CotpDataUnit {
    /// Frame the unit arrived in.
    pub frame: FrameId,
    /// Network source address.
    pub source: EndpointAddress,
    /// Network destination address.
    pub destination: EndpointAddress,
    /// Destination reference, absent for classes 0 and 1.
    pub destination_ref: Option<u16>,
    /// End-of-TSDU mark: this unit ends the transport service data unit.
    pub end_of_tsdu: bool,
    /// User data following the header.
    pub payload: Bytes,
}

/// COTP reassembly front end.
#[derive(Debug)]
pub struct CotpReassembly {
    enabled: bool,
    reassembler: SequenceReassembler,
}

impl CotpReassembly {
    /// Create the front end; `enabled` mirrors the user's reassembly setting.
    #[must_use]
    pub fn new(enabled: bool, eviction: EvictionConfig) -> Self {
        Self {
            enabled,
            reassembler: SequenceReassembler::with_eviction(
                SequenceDiscipline::new(KeySynthesizer::new()),
                eviction.build(),
            ),
        }
    }

    /// Whether reassembly is enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool { self.enabled }

    /// Borrow the underlying reassembler.
    #[must_use]
    pub const fn reassembler(&self) -> &SequenceReassembler { &self.reassembler }

    /// Drop all reassembly state and restart implicit numbering.
    pub fn reset(&mut self) { self.reassembler.reset(); }

    /// Key for `unit`, synthesized when the wire carries no reference.
    #[must_use]
    pub fn key(&self, unit: &CotpDataUnit) -> FragmentKey {
        let source = unit.source.clone();
        let destination = unit.destination.clone();
        match unit.destination_ref {
            Some(reference) => self
                .reassembler
                .discipline()
                .reference_key(source, destination, reference),
            None => self
                .reassembler
                .discipline()
                .synthesize_key(source, destination),
        }
    }

    /// Process one unit.
    pub fn process(&mut self, unit: CotpDataUnit) -> Disposition {
        if !self.enabled {
            return if unit.end_of_tsdu {
                Disposition::Whole(unit.payload)
            } else {
                Disposition::Segment
            };
        }

        let key = self.key(&unit);
        debug!(
            "cotp data unit: frame={}, key={key}, eot={}",
            unit.frame, unit.end_of_tsdu
        );
        let fragment = Fragment::in_sequence(unit.payload, unit.end_of_tsdu, unit.frame);
        self.reassembler.add_fragment(&key, fragment).into()
    }
}
