//! Keyed table of reassemblies in progress or finished.
//!
//! The store is session-scoped: it only grows between [`FragmentStore::reset`]
//! calls, apart from entries an [`EvictionPolicy`] selects. Fragment bytes of
//! a finished entry are never dropped while the entry lives.

use std::collections::{HashMap, hash_map::Entry};

use bytes::Bytes;
use log::debug;

use super::{EvictionPolicy, Fragment, FragmentKey, FrameId, Reason};

/// Lifecycle position of one reassembly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReassemblyStatus {
    /// Still collecting fragments.
    InProgress,
    /// Every byte has arrived; terminal.
    Complete,
    /// Abandoned after an anomaly; terminal.
    Error(Reason),
}

impl ReassemblyStatus {
    /// Whether no further fragment may change the reassembly.
    #[must_use]
    pub const fn is_terminal(self) -> bool { !matches!(self, Self::InProgress) }
}

/// Mutable per-key reassembly state.
#[derive(Clone, Debug)]
pub struct Reassembly {
    fragments: Vec<Fragment>,
    total_length: Option<u32>,
    status: ReassemblyStatus,
    first_frame: FrameId,
    last_frame: FrameId,
    completed_in: Option<FrameId>,
    assembled: Option<Bytes>,
    benign_overlaps: Vec<FrameId>,
    late_frames: Vec<FrameId>,
}

impl Reassembly {
    fn new(first_frame: FrameId) -> Self {
        Self {
            fragments: Vec::new(),
            total_length: None,
            status: ReassemblyStatus::InProgress,
            first_frame,
            last_frame: first_frame,
            completed_in: None,
            assembled: None,
            benign_overlaps: Vec::new(),
            late_frames: Vec::new(),
        }
    }

    /// Accepted fragments in arrival order.
    #[must_use]
    pub fn fragments(&self) -> &[Fragment] { &self.fragments }

    /// Declared message length, once any fragment has declared one.
    #[must_use]
    pub const fn total_length(&self) -> Option<u32> { self.total_length }

    /// Current lifecycle status.
    #[must_use]
    pub const fn status(&self) -> ReassemblyStatus { self.status }

    /// Frame that created this entry.
    #[must_use]
    pub const fn first_frame(&self) -> FrameId { self.first_frame }

    /// Most recent frame that touched this entry.
    #[must_use]
    pub const fn last_frame(&self) -> FrameId { self.last_frame }

    /// Frame whose fragment completed the message.
    #[must_use]
    pub const fn completed_in(&self) -> Option<FrameId> { self.completed_in }

    /// Reassembled bytes, once complete.
    #[must_use]
    pub fn assembled(&self) -> Option<&Bytes> { self.assembled.as_ref() }

    /// Frames whose fragments duplicated bytes already held.
    #[must_use]
    pub fn benign_overlaps(&self) -> &[FrameId] { &self.benign_overlaps }

    /// Frames that arrived after the entry reached a terminal status.
    #[must_use]
    pub fn late_frames(&self) -> &[FrameId] { &self.late_frames }

    /// The tail fragment, if one has been accepted.
    #[must_use]
    pub fn tail(&self) -> Option<&Fragment> { self.fragments.iter().find(|f| f.is_tail()) }

    pub(crate) fn touch(&mut self, frame: FrameId) {
        if frame > self.last_frame {
            self.last_frame = frame;
        }
    }

    pub(crate) fn set_total_length(&mut self, total_length: u32) {
        if self.total_length.is_none() {
            self.total_length = Some(total_length);
        }
    }

    pub(crate) fn record(&mut self, fragment: Fragment) {
        self.touch(fragment.frame());
        self.fragments.push(fragment);
    }

    pub(crate) fn note_benign_overlap(&mut self, frame: FrameId) {
        self.benign_overlaps.push(frame);
    }

    pub(crate) fn note_late(&mut self, frame: FrameId) { self.late_frames.push(frame); }

    pub(crate) fn complete(&mut self, frame: FrameId, assembled: Bytes) {
        self.status = ReassemblyStatus::Complete;
        self.completed_in = Some(frame);
        self.assembled = Some(assembled);
    }

    pub(crate) fn fail(&mut self, frame: FrameId, reason: Reason) {
        self.touch(frame);
        self.status = ReassemblyStatus::Error(reason);
    }
}

/// Session-scoped map from [`FragmentKey`] to [`Reassembly`].
///
/// # Examples
///
/// ```
/// use osi_reassembly::reassembly::{EndpointAddress, FragmentKey, FragmentStore, FrameId};
///
/// let mut store = FragmentStore::new();
/// let key = FragmentKey::network(
///     EndpointAddress::new(&b"a"[..]),
///     EndpointAddress::new(&b"b"[..]),
///     7,
/// );
/// store.get_or_create(&key, FrameId::new(1));
/// assert!(store.lookup(&key).is_some());
/// store.reset();
/// assert!(store.lookup(&key).is_none());
/// ```
#[derive(Debug, Default)]
pub struct FragmentStore {
    entries: HashMap<FragmentKey, Reassembly>,
}

impl FragmentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Discard every entry. Idempotent.
    pub fn reset(&mut self) { self.entries.clear(); }

    /// Return the entry for `key`, inserting a fresh in-progress one if absent.
    pub fn get_or_create(&mut self, key: &FragmentKey, frame: FrameId) -> &mut Reassembly {
        match self.entries.entry(key.clone()) {
            Entry::Occupied(occupied) => occupied.into_mut(),
            Entry::Vacant(vacant) => {
                debug!("opened reassembly: key={key}, frame={frame}");
                vacant.insert(Reassembly::new(frame))
            }
        }
    }

    /// Read-only view of the entry for `key`.
    #[must_use]
    pub fn lookup(&self, key: &FragmentKey) -> Option<&Reassembly> { self.entries.get(key) }

    pub(crate) fn lookup_mut(&mut self, key: &FragmentKey) -> Option<&mut Reassembly> {
        self.entries.get_mut(key)
    }

    /// Number of keys held.
    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    /// Whether the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Drop the entries `policy` selects as of `now`, before a fragment for
    /// `incoming` is stored.
    ///
    /// Returns the evicted keys.
    pub fn sweep(
        &mut self,
        now: FrameId,
        incoming: &FragmentKey,
        policy: &mut dyn EvictionPolicy,
    ) -> Vec<FragmentKey> {
        let mut entries = self.entries.iter();
        let victims = policy.select(now, incoming, &mut entries);
        victims
            .into_iter()
            .filter(|key| self.entries.remove(key).is_some())
            .collect()
    }
}
