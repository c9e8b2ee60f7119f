//! What a calling decoder should do with one unit after reassembly.

use std::fmt;

use bytes::Bytes;

use crate::reassembly::{FrameId, Outcome, Reason, ReassembledMessage};

/// Rendering instruction for one decoded unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// The unit's payload is a whole message; decode it directly.
    Whole(Bytes),
    /// This unit completed a message; decode the reassembled bytes.
    Reassembled(ReassembledMessage),
    /// Show the unit as an opaque, not-yet-decodable fragment.
    Segment,
    /// The unit belongs to a message already reassembled in another frame.
    ReassembledIn(FrameId),
    /// Reassembly failed; flag the unit as malformed.
    Malformed(Reason),
}

impl From<Outcome> for Disposition {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Pending => Self::Segment,
            Outcome::Complete(message) => Self::Reassembled(message),
            Outcome::AlreadyCompleted { frame } => Self::ReassembledIn(frame),
            Outcome::Rejected(reason) => Self::Malformed(reason),
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Whole(bytes) => write!(f, "whole ({} bytes)", bytes.len()),
            Self::Reassembled(message) => {
                write!(
                    f,
                    "reassembled ({} segments, {} bytes):",
                    message.segments().len(),
                    message.payload().len()
                )?;
                for segment in message.segments() {
                    write!(f, " #{}({})", segment.frame, segment.len)?;
                }
                Ok(())
            }
            Self::Segment => f.write_str("segment"),
            Self::ReassembledIn(frame) => write!(f, "reassembled in frame {frame}"),
            Self::Malformed(reason) => write!(f, "malformed: {reason}"),
        }
    }
}
