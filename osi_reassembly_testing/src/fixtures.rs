//! Builders for keys, fragments and decoded units.

use bytes::Bytes;
use osi_reassembly::{
    ChecksumStatus,
    ClnpSegment,
    CotpDataUnit,
    reassembly::{EndpointAddress, Fragment, FragmentKey, FrameId},
};

/// Endpoint address from a short label.
pub fn address(label: &str) -> EndpointAddress {
    EndpointAddress::new(Bytes::copy_from_slice(label.as_bytes()))
}

/// Network-layer key between the `src`/`dst` endpoints.
pub fn network_key(data_unit_id: u16) -> FragmentKey {
    FragmentKey::network(address("src"), address("dst"), data_unit_id)
}

/// Transport-layer key between the `src`/`dst` endpoints.
pub fn transport_key(reference: u16) -> FragmentKey {
    FragmentKey::transport(address("src"), address("dst"), reference)
}

/// Offset-placed fragment.
pub fn offset_fragment(offset: u32, payload: &[u8], is_tail: bool, frame: u32) -> Fragment {
    Fragment::at_offset(
        offset,
        Bytes::copy_from_slice(payload),
        is_tail,
        FrameId::new(frame),
    )
}

/// Arrival-ordered fragment.
pub fn sequence_fragment(payload: &[u8], is_tail: bool, frame: u32) -> Fragment {
    Fragment::in_sequence(Bytes::copy_from_slice(payload), is_tail, FrameId::new(frame))
}

/// COTP data unit between the `src`/`dst` endpoints.
pub fn cotp_unit(
    frame: u32,
    destination_ref: Option<u16>,
    end_of_tsdu: bool,
    payload: &[u8],
) -> CotpDataUnit {
    CotpDataUnit {
        frame: FrameId::new(frame),
        source: address("src"),
        destination: address("dst"),
        destination_ref,
        end_of_tsdu,
        payload: Bytes::copy_from_slice(payload),
    }
}

/// Builder for [`ClnpSegment`] values with a 20-byte header by default.
#[derive(Clone, Debug)]
pub struct ClnpSegmentBuilder {
    segment: ClnpSegment,
}

impl ClnpSegmentBuilder {
    /// Header length used for every built segment.
    pub const HEADER_LENGTH: u16 = 20;

    /// Segment of datagram `data_unit_id` at data `offset` in `frame`.
    ///
    /// The declared datagram ends with this segment until
    /// [`data_total`](Self::data_total) says otherwise.
    pub fn new(frame: u32, data_unit_id: u16, offset: u16, payload: &[u8]) -> Self {
        let data_len = u16::try_from(payload.len()).expect("payload fits a segment");
        Self {
            segment: ClnpSegment {
                frame: FrameId::new(frame),
                source: address("src"),
                destination: address("dst"),
                data_unit_id,
                segment_offset: offset,
                total_length: Self::HEADER_LENGTH + offset + data_len,
                header_length: Self::HEADER_LENGTH,
                segment_length: Self::HEADER_LENGTH + data_len,
                more_segments: false,
                segmentation_permitted: true,
                checksum: ChecksumStatus::Good,
                payload: Bytes::copy_from_slice(payload),
            },
        }
    }

    /// Declare the original datagram's data length.
    #[must_use]
    pub fn data_total(mut self, data_total: u16) -> Self {
        self.segment.total_length = self.segment.header_length + data_total;
        self
    }

    /// Set the more-segments flag.
    #[must_use]
    pub fn more(mut self, more_segments: bool) -> Self {
        self.segment.more_segments = more_segments;
        self
    }

    /// Set the checksum verification result.
    #[must_use]
    pub fn checksum(mut self, checksum: ChecksumStatus) -> Self {
        self.segment.checksum = checksum;
        self
    }

    /// Set the segmentation-permitted flag.
    #[must_use]
    pub fn segmentation_permitted(mut self, permitted: bool) -> Self {
        self.segment.segmentation_permitted = permitted;
        self
    }

    /// Declare a segment longer than what was captured.
    #[must_use]
    pub fn truncated_by(mut self, missing: u16) -> Self {
        self.segment.segment_length += missing;
        self
    }

    /// Finish the segment.
    pub fn build(self) -> ClnpSegment { self.segment }
}
