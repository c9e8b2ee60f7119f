//! Eviction hook bounding how much reassembly state a session retains.
//!
//! The store consults its policy before every fragment. [`NeverEvict`] keeps
//! everything for the life of the session; the other stock policies cap the
//! entry count or drop entries that have gone quiet.

use std::{fmt, num::NonZeroU32, num::NonZeroUsize};

use serde::{Deserialize, Serialize};

use super::{FragmentKey, FrameId, Reassembly};

/// Selects store entries to discard.
pub trait EvictionPolicy: fmt::Debug + Send {
    /// Return the keys to evict, given every entry currently held.
    ///
    /// `incoming` is the key about to receive a fragment; it may or may not
    /// be among `entries`. Implementations that never evict should return
    /// without iterating.
    fn select<'a>(
        &mut self,
        now: FrameId,
        incoming: &FragmentKey,
        entries: &mut dyn Iterator<Item = (&'a FragmentKey, &'a Reassembly)>,
    ) -> Vec<FragmentKey>;
}

/// Retain every entry until the session is reset.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverEvict;

impl EvictionPolicy for NeverEvict {
    fn select<'a>(
        &mut self,
        _now: FrameId,
        _incoming: &FragmentKey,
        _entries: &mut dyn Iterator<Item = (&'a FragmentKey, &'a Reassembly)>,
    ) -> Vec<FragmentKey> {
        Vec::new()
    }
}

/// Keep at most `max_entries` besides the incoming key, dropping those
/// opened earliest.
///
/// The key being fed is never a victim, so the store holds at most
/// `max_entries + 1` keys once the fragment is stored.
#[derive(Clone, Copy, Debug)]
pub struct CapacityLimit {
    max_entries: NonZeroUsize,
}

impl CapacityLimit {
    /// Create a limit of `max_entries` keys.
    #[must_use]
    pub const fn new(max_entries: NonZeroUsize) -> Self { Self { max_entries } }
}

impl EvictionPolicy for CapacityLimit {
    fn select<'a>(
        &mut self,
        _now: FrameId,
        incoming: &FragmentKey,
        entries: &mut dyn Iterator<Item = (&'a FragmentKey, &'a Reassembly)>,
    ) -> Vec<FragmentKey> {
        let mut held: Vec<_> = entries
            .filter(|(key, _)| *key != incoming)
            .map(|(key, reassembly)| (reassembly.first_frame(), key))
            .collect();
        let excess = held.len().saturating_sub(self.max_entries.get());
        if excess == 0 {
            return Vec::new();
        }
        held.select_nth_unstable_by_key(excess, |(first_frame, _)| *first_frame);
        held.truncate(excess);
        held.into_iter().map(|(_, key)| key.clone()).collect()
    }
}

/// Drop entries not touched within `max_age` frames.
///
/// The incoming key is judged like any other: a stale entry is dropped and
/// the fragment starts a fresh reassembly.
#[derive(Clone, Copy, Debug)]
pub struct FrameAgeLimit {
    max_age: NonZeroU32,
}

impl FrameAgeLimit {
    /// Create a limit of `max_age` frames since an entry was last touched.
    #[must_use]
    pub const fn new(max_age: NonZeroU32) -> Self { Self { max_age } }
}

impl EvictionPolicy for FrameAgeLimit {
    fn select<'a>(
        &mut self,
        now: FrameId,
        _incoming: &FragmentKey,
        entries: &mut dyn Iterator<Item = (&'a FragmentKey, &'a Reassembly)>,
    ) -> Vec<FragmentKey> {
        let max_age = self.max_age.get();
        entries
            .filter(|(_, reassembly)| now.frames_since(reassembly.last_frame()) > max_age)
            .map(|(key, _)| key.clone())
            .collect()
    }
}

/// Declarative choice of eviction policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvictionConfig {
    /// Never evict within a session.
    #[default]
    Never,
    /// Cap the number of keys held.
    Capacity(NonZeroUsize),
    /// Evict keys idle for more than this many frames.
    FrameAge(NonZeroU32),
}

impl EvictionConfig {
    /// Instantiate the configured policy.
    #[must_use]
    pub fn build(self) -> Box<dyn EvictionPolicy> {
        match self {
            Self::Never => Box::new(NeverEvict),
            Self::Capacity(max_entries) => Box::new(CapacityLimit::new(max_entries)),
            Self::FrameAge(max_age) => Box::new(FrameAgeLimit::new(max_age)),
        }
    }
}
