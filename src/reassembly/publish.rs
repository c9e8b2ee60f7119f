//! Building the reassembled buffer and answering completion queries.

use bytes::{Bytes, BytesMut};

use super::{Fragment, FragmentKey, FragmentStore, FrameId, Reassembly, ReassemblyStatus};

/// One contributing fragment, as listed alongside a reassembled message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SegmentSummary {
    /// Frame the fragment arrived in.
    pub frame: FrameId,
    /// Byte offset of the fragment within the message.
    pub offset: usize,
    /// Fragment length in bytes.
    pub len: usize,
}

/// Immutable result of a finished reassembly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReassembledMessage {
    payload: Bytes,
    completed_in: FrameId,
    segments: Vec<SegmentSummary>,
}

impl ReassembledMessage {
    /// Construct a new [`ReassembledMessage`].
    #[must_use]
    pub fn new(payload: Bytes, completed_in: FrameId, segments: Vec<SegmentSummary>) -> Self {
        Self {
            payload,
            completed_in,
            segments,
        }
    }

    /// Borrow the contiguous message bytes.
    #[must_use]
    pub fn payload(&self) -> &Bytes { &self.payload }

    /// Consume the message, returning the owned bytes.
    #[must_use]
    pub fn into_payload(self) -> Bytes { self.payload }

    /// Frame whose fragment completed the message.
    #[must_use]
    pub const fn completed_in(&self) -> FrameId { self.completed_in }

    /// Contributing fragments in message order.
    #[must_use]
    pub fn segments(&self) -> &[SegmentSummary] { &self.segments }
}

/// Stateless view answering "was this message finished, and where".
#[derive(Clone, Copy, Debug, Default)]
pub struct CompletionPublisher;

impl CompletionPublisher {
    /// Lay offset-placed fragments into one buffer spanning `[0, end)`.
    ///
    /// `end` is the tail's end when a tail is held, otherwise the furthest
    /// byte held. The result depends only on the fragment set, not on
    /// arrival order: overlapping bytes are identical by the time this runs.
    #[must_use]
    pub fn assemble_by_offset(fragments: &[Fragment]) -> Bytes {
        let tail_end = fragments
            .iter()
            .find(|fragment| fragment.is_tail())
            .and_then(Fragment::range)
            .map(|range| range.end);
        let end = tail_end.unwrap_or_else(|| {
            fragments
                .iter()
                .filter_map(Fragment::range)
                .map(|range| range.end)
                .max()
                .unwrap_or(0)
        });
        let mut buffer = BytesMut::zeroed(end);
        for fragment in fragments {
            let Some(range) = fragment.range() else {
                continue;
            };
            let stop = range.end.min(end);
            if range.start < stop {
                buffer[range.start..stop]
                    .copy_from_slice(&fragment.payload()[..stop - range.start]);
            }
        }
        buffer.freeze()
    }

    /// Concatenate fragments in arrival order.
    #[must_use]
    pub fn assemble_in_arrival_order(fragments: &[Fragment]) -> Bytes {
        let mut buffer = BytesMut::with_capacity(fragments.iter().map(Fragment::len).sum());
        for fragment in fragments {
            buffer.extend_from_slice(fragment.payload());
        }
        buffer.freeze()
    }

    /// Summaries of offset-placed fragments, ordered by offset then frame.
    #[must_use]
    pub fn offset_segments(fragments: &[Fragment]) -> Vec<SegmentSummary> {
        let mut segments: Vec<_> = fragments
            .iter()
            .filter_map(|fragment| {
                fragment.range().map(|range| SegmentSummary {
                    frame: fragment.frame(),
                    offset: range.start,
                    len: range.len(),
                })
            })
            .collect();
        segments.sort_by_key(|segment| (segment.offset, segment.frame));
        segments
    }

    /// Summaries of arrival-ordered fragments with running offsets.
    #[must_use]
    pub fn sequence_segments(fragments: &[Fragment]) -> Vec<SegmentSummary> {
        let mut offset = 0;
        fragments
            .iter()
            .map(|fragment| {
                let segment = SegmentSummary {
                    frame: fragment.frame(),
                    offset,
                    len: fragment.len(),
                };
                offset += fragment.len();
                segment
            })
            .collect()
    }

    /// Frame in which `key`'s message was completed, if it was.
    #[must_use]
    pub fn reassembled_in(store: &FragmentStore, key: &FragmentKey) -> Option<FrameId> {
        store.lookup(key).and_then(Reassembly::completed_in)
    }

    /// The completed message for `key`, rebuilt from stored state.
    ///
    /// Lets a caller re-process the completing frame and obtain the same
    /// result it was handed the first time.
    #[must_use]
    pub fn completion(
        store: &FragmentStore,
        key: &FragmentKey,
        segments: impl FnOnce(&[Fragment]) -> Vec<SegmentSummary>,
    ) -> Option<ReassembledMessage> {
        let reassembly = store.lookup(key)?;
        if reassembly.status() != ReassemblyStatus::Complete {
            return None;
        }
        Some(ReassembledMessage::new(
            reassembly.assembled()?.clone(),
            reassembly.completed_in()?,
            segments(reassembly.fragments()),
        ))
    }
}
