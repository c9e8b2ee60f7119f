//! Keyed reassembly engine shared by both addressing disciplines.
//!
//! [`Reassembler`] owns the session's [`FragmentStore`] and routes each
//! fragment through its [`ReassemblyDiscipline`]. Callers see only
//! [`Reassembler::add_fragment`] and read-only lookups; fragment internals
//! stay behind the engine.

use log::{debug, warn};

use super::{
    Admission,
    CompletionPublisher,
    EvictionPolicy,
    Fragment,
    FragmentKey,
    FragmentStore,
    FrameId,
    KeySynthesizer,
    NeverEvict,
    OffsetDiscipline,
    Reason,
    ReassembledMessage,
    Reassembly,
    ReassemblyDiscipline,
    ReassemblyStatus,
    SequenceDiscipline,
};
use crate::metrics;

/// Result of feeding one fragment to a [`Reassembler`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Stored; more fragments are needed.
    Pending,
    /// This fragment finished the message.
    Complete(ReassembledMessage),
    /// The key's message was already finished in `frame`.
    AlreadyCompleted {
        /// Frame that completed the message.
        frame: FrameId,
    },
    /// The key's reassembly was abandoned, or the fragment was unusable.
    Rejected(Reason),
}

/// Reassembler for network-layer segments placed by byte offset.
pub type OffsetReassembler = Reassembler<OffsetDiscipline>;

/// Reassembler for transport-layer units placed by arrival order.
pub type SequenceReassembler = Reassembler<SequenceDiscipline>;

/// Stateful, single-threaded reassembly engine.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use osi_reassembly::reassembly::{
///     EndpointAddress,
///     Fragment,
///     FragmentKey,
///     FrameId,
///     OffsetReassembler,
///     Outcome,
/// };
///
/// let mut reassembler = OffsetReassembler::offset();
/// let key = FragmentKey::network(
///     EndpointAddress::new(&b"src"[..]),
///     EndpointAddress::new(&b"dst"[..]),
///     1,
/// );
/// let tail = Fragment::at_offset(3, Bytes::from_static(b"def"), true, FrameId::new(1));
/// let head = Fragment::at_offset(0, Bytes::from_static(b"abc"), false, FrameId::new(2));
///
/// assert_eq!(reassembler.add_fragment(&key, tail), Outcome::Pending);
/// let Outcome::Complete(message) = reassembler.add_fragment(&key, head) else {
///     panic!("message should complete");
/// };
/// assert_eq!(message.payload().as_ref(), b"abcdef");
/// assert_eq!(message.completed_in(), FrameId::new(2));
/// ```
#[derive(Debug)]
pub struct Reassembler<D> {
    discipline: D,
    store: FragmentStore,
    eviction: Box<dyn EvictionPolicy>,
}

impl OffsetReassembler {
    /// Create an offset-discipline reassembler that never evicts.
    #[must_use]
    pub fn offset() -> Self { Self::new(OffsetDiscipline) }
}

impl SequenceReassembler {
    /// Create a sequence-discipline reassembler around `keys`.
    #[must_use]
    pub fn sequence(keys: KeySynthesizer) -> Self { Self::new(SequenceDiscipline::new(keys)) }
}

impl<D: ReassemblyDiscipline> Reassembler<D> {
    /// Create a reassembler that never evicts within a session.
    #[must_use]
    pub fn new(discipline: D) -> Self { Self::with_eviction(discipline, Box::new(NeverEvict)) }

    /// Create a reassembler consulting `eviction` before every fragment.
    #[must_use]
    pub fn with_eviction(discipline: D, eviction: Box<dyn EvictionPolicy>) -> Self {
        Self {
            discipline,
            store: FragmentStore::new(),
            eviction,
        }
    }

    /// Borrow the discipline.
    #[must_use]
    pub const fn discipline(&self) -> &D { &self.discipline }

    /// Read-only access to the session's store.
    #[must_use]
    pub const fn store(&self) -> &FragmentStore { &self.store }

    /// Read-only query for `key`'s reassembly.
    #[must_use]
    pub fn lookup(&self, key: &FragmentKey) -> Option<&Reassembly> { self.store.lookup(key) }

    /// The completed message for `key`, if it has completed.
    #[must_use]
    pub fn completion(&self, key: &FragmentKey) -> Option<ReassembledMessage> {
        CompletionPublisher::completion(&self.store, key, |fragments| {
            self.discipline.segments(fragments)
        })
    }

    /// Frame in which `key`'s message completed, if it has.
    #[must_use]
    pub fn reassembled_in(&self, key: &FragmentKey) -> Option<FrameId> {
        CompletionPublisher::reassembled_in(&self.store, key)
    }

    /// Start a new session: drop every key and discipline-private state.
    pub fn reset(&mut self) {
        self.store.reset();
        self.discipline.reset();
    }

    /// Feed one fragment for `key`.
    ///
    /// A key that already finished, successfully or not, is answered from
    /// stored state: its bytes never change again, although the frame is
    /// noted as a late arrival.
    pub fn add_fragment(&mut self, key: &FragmentKey, fragment: Fragment) -> Outcome {
        let frame = fragment.frame();
        self.sweep(key, frame);
        metrics::inc_fragments(D::NAME);

        if !self.discipline.places(&fragment) {
            warn!(
                "fragment placement does not suit {} reassembly: key={key}, frame={frame}",
                D::NAME
            );
            metrics::inc_rejected(D::NAME, Reason::PlacementMismatch);
            return Outcome::Rejected(Reason::PlacementMismatch);
        }

        if let Some(reassembly) = self.store.lookup_mut(key) {
            match reassembly.status() {
                ReassemblyStatus::Complete => {
                    reassembly.note_late(frame);
                    let completed_in = reassembly.completed_in().unwrap_or(frame);
                    debug!(
                        "fragment for finished message: key={key}, frame={frame}, \
                         completed_in={completed_in}"
                    );
                    return Outcome::AlreadyCompleted {
                        frame: completed_in,
                    };
                }
                ReassemblyStatus::Error(reason) => {
                    reassembly.note_late(frame);
                    return Outcome::Rejected(reason);
                }
                ReassemblyStatus::InProgress => {}
            }
        }

        let reassembly = self.store.get_or_create(key, frame);
        let admission = match self.discipline.admit(reassembly, &fragment) {
            Ok(admission) => admission,
            Err(reason) => {
                warn!("reassembly abandoned: key={key}, frame={frame}, reason={reason}");
                reassembly.fail(frame, reason);
                metrics::inc_rejected(D::NAME, reason);
                return Outcome::Rejected(reason);
            }
        };

        if let Some(declared) = fragment.total_length() {
            match reassembly.total_length() {
                None => reassembly.set_total_length(declared),
                Some(known) if known != declared => debug!(
                    "ignoring conflicting total length: key={key}, frame={frame}, \
                     known={known}, declared={declared}"
                ),
                Some(_) => {}
            }
        }
        if admission == Admission::OverlapBenign {
            debug!("duplicate segment bytes: key={key}, frame={frame}");
            reassembly.note_benign_overlap(frame);
        }
        reassembly.record(fragment);

        if !self.discipline.is_complete(reassembly) {
            return Outcome::Pending;
        }

        let payload = self.discipline.assemble(reassembly.fragments());
        let segments = self.discipline.segments(reassembly.fragments());
        reassembly.complete(frame, payload.clone());
        debug!(
            "reassembly complete: key={key}, frame={frame}, bytes={}, segments={}",
            payload.len(),
            segments.len()
        );
        self.discipline.completed(key);
        metrics::inc_completed(D::NAME);
        Outcome::Complete(ReassembledMessage::new(payload, frame, segments))
    }

    fn sweep(&mut self, incoming: &FragmentKey, now: FrameId) {
        let evicted = self.store.sweep(now, incoming, self.eviction.as_mut());
        if !evicted.is_empty() {
            debug!(
                "evicted reassemblies: count={}, keys={evicted:?}",
                evicted.len()
            );
            metrics::inc_evicted(evicted.len());
        }
    }
}
