//! One wire unit's contribution to a logical message.

use std::ops::Range;

use bytes::Bytes;
use derive_more::{Display, From, Into};

/// Identifier of the processing unit (captured frame) a fragment arrived in.
///
/// # Examples
///
/// ```
/// use osi_reassembly::reassembly::FrameId;
/// let frame = FrameId::new(12);
/// assert_eq!(frame.get(), 12);
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into,
)]
#[display("{_0}")]
pub struct FrameId(u32);

impl FrameId {
    /// Create a frame identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self { Self(value) }

    /// Return the numeric frame number.
    #[must_use]
    pub const fn get(self) -> u32 { self.0 }

    /// Number of frames between `earlier` and `self`, zero if `earlier` is later.
    #[must_use]
    pub const fn frames_since(self, earlier: Self) -> u32 { self.0.saturating_sub(earlier.0) }
}

/// Where a fragment's bytes belong in the reassembled message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Placement {
    /// Absolute byte offset declared by the fragment itself.
    Offset(u32),
    /// Position implied by arrival order.
    Ordinal,
}

/// A received fragment awaiting admission into a reassembly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fragment {
    placement: Placement,
    payload: Bytes,
    is_tail: bool,
    total_length: Option<u32>,
    frame: FrameId,
}

impl Fragment {
    /// Create a fragment positioned by an explicit byte offset.
    ///
    /// # Examples
    ///
    /// ```
    /// use bytes::Bytes;
    /// use osi_reassembly::reassembly::{Fragment, FrameId};
    ///
    /// let fragment = Fragment::at_offset(20, Bytes::from_static(b"tail"), true, FrameId::new(3))
    ///     .with_total_length(24);
    /// assert_eq!(fragment.range(), Some(20..24));
    /// assert_eq!(fragment.total_length(), Some(24));
    /// ```
    #[must_use]
    pub fn at_offset(offset: u32, payload: Bytes, is_tail: bool, frame: FrameId) -> Self {
        Self {
            placement: Placement::Offset(offset),
            payload,
            is_tail,
            total_length: None,
            frame,
        }
    }

    /// Create a fragment positioned only by its arrival order.
    #[must_use]
    pub fn in_sequence(payload: Bytes, is_tail: bool, frame: FrameId) -> Self {
        Self {
            placement: Placement::Ordinal,
            payload,
            is_tail,
            total_length: None,
            frame,
        }
    }

    /// Attach the message total length declared by this fragment.
    #[must_use]
    pub fn with_total_length(mut self, total_length: u32) -> Self {
        self.total_length = Some(total_length);
        self
    }

    /// Return the fragment placement.
    #[must_use]
    pub const fn placement(&self) -> Placement { self.placement }

    /// Borrow the payload bytes.
    #[must_use]
    pub fn payload(&self) -> &Bytes { &self.payload }

    /// Payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize { self.payload.len() }

    /// Whether the fragment carries no payload.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.payload.is_empty() }

    /// Whether the fragment declares itself the last piece of the message.
    #[must_use]
    pub const fn is_tail(&self) -> bool { self.is_tail }

    /// Message total length declared by this fragment, if any.
    #[must_use]
    pub const fn total_length(&self) -> Option<u32> { self.total_length }

    /// Frame the fragment arrived in.
    #[must_use]
    pub const fn frame(&self) -> FrameId { self.frame }

    /// Byte range covered within the message, for offset-placed fragments.
    #[must_use]
    pub fn range(&self) -> Option<Range<usize>> {
        match self.placement {
            Placement::Offset(offset) => {
                let start = offset as usize;
                Some(start..start.saturating_add(self.payload.len()))
            }
            Placement::Ordinal => None,
        }
    }
}
