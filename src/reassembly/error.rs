//! Anomaly classification emitted by the reassembly engine.
//!
//! Every variant is local to a single [`FragmentKey`](crate::reassembly::FragmentKey):
//! callers translate it into a malformed-unit diagnostic and keep going.

use thiserror::Error;

use super::FrameId;

/// Reason a reassembly was abandoned or a fragment refused.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum Reason {
    /// Two fragments claim the same bytes with different content.
    #[error("overlapping segment conflicts at byte {at} with frame {frame}")]
    OverlapConflict {
        /// First message byte at which the contents differ.
        at: usize,
        /// Frame holding the previously recorded fragment.
        frame: FrameId,
    },
    /// A second fragment claims to be the last one.
    #[error("multiple tail segments; first tail arrived in frame {first}")]
    MultipleTails {
        /// Frame that delivered the first tail.
        first: FrameId,
    },
    /// A fragment extends past the declared end of the message.
    #[error("segment ends at byte {end}, beyond message end {bound}")]
    TooLongSegment {
        /// Exclusive end of the offending byte range.
        end: usize,
        /// Declared message length the range was checked against.
        bound: usize,
    },
    /// The fragment's placement does not match the reassembler's discipline.
    ///
    /// This signals caller misuse and never alters stored state.
    #[error("fragment placement does not match the reassembly discipline")]
    PlacementMismatch,
}

impl Reason {
    /// Short, stable label used in logs and metric labels.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::OverlapConflict { .. } => "overlap_conflict",
            Self::MultipleTails { .. } => "multiple_tails",
            Self::TooLongSegment { .. } => "too_long_segment",
            Self::PlacementMismatch => "placement_mismatch",
        }
    }
}
