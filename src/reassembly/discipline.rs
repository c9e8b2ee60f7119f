//! The two addressing disciplines a [`Reassembler`](super::Reassembler) can run.
//!
//! Both share the store and the gap analyser; they differ only in how a
//! fragment's position is known, when the message counts as complete, and in
//! what order bytes are laid out.

use std::fmt;

use bytes::Bytes;

use super::{
    Admission,
    CompletionPublisher,
    EndpointAddress,
    Fragment,
    FragmentKey,
    GapAnalyzer,
    KeySynthesizer,
    Placement,
    Reason,
    Reassembly,
    SegmentSummary,
};

/// Capability shared by offset-driven and arrival-driven reassembly.
pub trait ReassemblyDiscipline: fmt::Debug {
    /// Label used in logs and metrics.
    const NAME: &'static str;

    /// Whether `fragment` carries the kind of placement this discipline uses.
    fn places(&self, fragment: &Fragment) -> bool;

    /// Decide whether `fragment` may join `reassembly`.
    ///
    /// # Errors
    ///
    /// Returns the [`Reason`] the reassembly must be abandoned for.
    fn admit(&self, reassembly: &Reassembly, fragment: &Fragment) -> Result<Admission, Reason>;

    /// Whether the accepted fragments form the whole message.
    fn is_complete(&self, reassembly: &Reassembly) -> bool;

    /// Build the contiguous message buffer.
    fn assemble(&self, fragments: &[Fragment]) -> Bytes;

    /// Describe contributing fragments in message order.
    fn segments(&self, fragments: &[Fragment]) -> Vec<SegmentSummary>;

    /// Called once after `key`'s message completes.
    fn completed(&mut self, _key: &FragmentKey) {}

    /// Drop any discipline-private state at a session boundary.
    fn reset(&mut self) {}
}

/// Fragments self-declare an absolute byte offset; arrival order is free.
#[derive(Clone, Copy, Debug, Default)]
pub struct OffsetDiscipline;

impl ReassemblyDiscipline for OffsetDiscipline {
    const NAME: &'static str = "offset";

    fn places(&self, fragment: &Fragment) -> bool {
        matches!(fragment.placement(), Placement::Offset(_))
    }

    fn admit(&self, reassembly: &Reassembly, fragment: &Fragment) -> Result<Admission, Reason> {
        GapAnalyzer::admit_offset(reassembly, fragment)
    }

    fn is_complete(&self, reassembly: &Reassembly) -> bool {
        GapAnalyzer::offset_complete(reassembly)
    }

    fn assemble(&self, fragments: &[Fragment]) -> Bytes {
        CompletionPublisher::assemble_by_offset(fragments)
    }

    fn segments(&self, fragments: &[Fragment]) -> Vec<SegmentSummary> {
        CompletionPublisher::offset_segments(fragments)
    }
}

/// Fragments carry only a continuation flag and arrive in transmission order.
///
/// Owns the [`KeySynthesizer`] numbering successive messages per connection,
/// so its counters share the store's session lifecycle.
#[derive(Clone, Debug, Default)]
pub struct SequenceDiscipline {
    keys: KeySynthesizer,
}

impl SequenceDiscipline {
    /// Create the discipline around `keys`.
    #[must_use]
    pub const fn new(keys: KeySynthesizer) -> Self { Self { keys } }

    /// Key for the current implicit connection between two endpoints.
    #[must_use]
    pub fn synthesize_key(
        &self,
        source: EndpointAddress,
        destination: EndpointAddress,
    ) -> FragmentKey {
        self.keys.key_for(source, destination)
    }

    /// Key for the current message on a connection named by `reference`.
    #[must_use]
    pub fn reference_key(
        &self,
        source: EndpointAddress,
        destination: EndpointAddress,
        reference: u16,
    ) -> FragmentKey {
        self.keys.reference_key(source, destination, reference)
    }

    /// Borrow the key synthesizer.
    #[must_use]
    pub const fn keys(&self) -> &KeySynthesizer { &self.keys }
}

impl ReassemblyDiscipline for SequenceDiscipline {
    const NAME: &'static str = "sequence";

    fn places(&self, fragment: &Fragment) -> bool {
        fragment.placement() == Placement::Ordinal
    }

    fn admit(&self, reassembly: &Reassembly, fragment: &Fragment) -> Result<Admission, Reason> {
        GapAnalyzer::admit_sequence(reassembly, fragment)
    }

    fn is_complete(&self, reassembly: &Reassembly) -> bool {
        GapAnalyzer::sequence_complete(reassembly)
    }

    fn assemble(&self, fragments: &[Fragment]) -> Bytes {
        CompletionPublisher::assemble_in_arrival_order(fragments)
    }

    fn segments(&self, fragments: &[Fragment]) -> Vec<SegmentSummary> {
        CompletionPublisher::sequence_segments(fragments)
    }

    fn completed(&mut self, key: &FragmentKey) { self.keys.completed(key); }

    fn reset(&mut self) { self.keys.reset(); }
}
