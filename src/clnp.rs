//! Network-layer boundary: CLNP segments into the offset reassembler.
//!
//! Header decoding and checksum verification happen upstream; this module
//! receives their results as a [`ClnpSegment`] and decides whether the unit
//! is eligible for reassembly.

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
        OffsetDiscipline,
        OffsetReassembler,
        ReassembledMessage,
    },
};

/// Outcome of the upstream header checksum verification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChecksumStatus {
    /// The checksum verified.
    Good,
    /// The checksum did not verify.
    Bad,
    /// The sender did not compute a checksum.
    #[default]
    Absent,
}

/// Decoded fields of one CLNP data unit relevant to segmentation.
#[derive(Clone, Debug)]
pub struct ClnpSegment {
    /// Frame the unit arrived in.
    pub frame: FrameId,
    /// Source NSAP.
    pub source: EndpointAddress,
    /// Destination NSAP.
    pub destination: EndpointAddress,
    /// Data-unit identifier shared by all segments of one datagram.
    pub data_unit_id: u16,
    /// Offset of this segment's data within the original data.
    pub segment_offset: u16,
    /// Total length of the original PDU, header included.
    pub total_length: u16,
    /// Length of this unit's header.
    pub header_length: u16,
    /// Length of this unit, header included.
    pub segment_length: u16,
    /// More-segments flag.
    pub more_segments: bool,
    /// Segmentation-permitted flag.
    pub segmentation_permitted: bool,
    /// Header checksum verification result.
    pub checksum: ChecksumStatus,
    /// Captured bytes following the header.
    pub payload: Bytes,
}

impl ClnpSegment {
    /// Whether the unit is one piece of a larger datagram.
    #[must_use]
    pub const fn is_segment(&self) -> bool { self.more_segments || self.segment_offset != 0 }

    /// Data length this unit declares.
    #[must_use]
    pub const fn data_length(&self) -> u16 { self.segment_length.saturating_sub(self.header_length) }

    /// Length of the original datagram's data.
    #[must_use]
    pub const fn data_total_length(&self) -> u16 {
        self.total_length.saturating_sub(self.header_length)
    }

    /// Key grouping this unit with the rest of its datagram.
    #[must_use]
    pub fn key(&self) -> FragmentKey {
        FragmentKey::network(
            self.source.clone(),
            self.destination.clone(),
            self.data_unit_id,
        )
    }

    fn is_fully_captured(&self) -> bool {
        self.payload.len() >= usize::from(self.data_length())
    }
}

/// CLNP reassembly front end.
#[derive(Debug)]
pub struct ClnpReassembly {
    enabled: bool,
    reassembler: OffsetReassembler,
}

impl ClnpReassembly {
    /// Create the front end; `enabled` mirrors the user's reassembly setting.
    #[must_use]
    pub fn new(enabled: bool, eviction: EvictionConfig) -> Self {
        Self {
            enabled,
            reassembler: OffsetReassembler::with_eviction(OffsetDiscipline, eviction.build()),
        }
    }

    /// Whether reassembly is enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool { self.enabled }

    /// Borrow the underlying reassembler.
    #[must_use]
    pub const fn reassembler(&self) -> &OffsetReassembler { &self.reassembler }

    /// Drop all reassembly state at a session boundary.
    pub fn reset(&mut self) { self.reassembler.reset(); }

    /// Whether `segment` qualifies for reassembly.
    #[must_use]
    pub fn is_eligible(&self, segment: &ClnpSegment) -> bool {
        self.enabled
            && segment.segmentation_permitted
            && segment.is_segment()
            && segment.is_fully_captured()
            && segment.checksum != ChecksumStatus::Bad
    }

    /// Process one unit.
    pub fn process(&mut self, segment: ClnpSegment) -> Disposition {
        if !segment.is_segment() {
            return Disposition::Whole(segment.payload);
        }
        if !self.is_eligible(&segment) {
            debug!(
                "clnp segment not reassembled: frame={}, du_id={}",
                segment.frame, segment.data_unit_id
            );
            return Disposition::Segment;
        }

        let key = segment.key();
        if let Some(message) = self.revisit(&key, segment.frame) {
            return Disposition::Reassembled(message);
        }

        let data = segment.payload.slice(..usize::from(segment.data_length()));
        let fragment = Fragment::at_offset(
            u32::from(segment.segment_offset),
            data,
            !segment.more_segments,
            segment.frame,
        )
        .with_total_length(u32::from(segment.data_total_length()));
        self.reassembler.add_fragment(&key, fragment).into()
    }

    /// Re-processing the completing frame yields the same message again.
    fn revisit(&self, key: &FragmentKey, frame: FrameId) -> Option<ReassembledMessage> {
        if self.reassembler.reassembled_in(key)? != frame {
            return None;
        }
        self.reassembler.completion(key)
    }
}
