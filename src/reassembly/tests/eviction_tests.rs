//! Tests for the eviction hook and the stock policies.

use std::num::{NonZeroU32, NonZeroUsize};

use rstest::rstest;

use super::{at, key};
use crate::reassembly::{
    CapacityLimit,
    EvictionConfig,
    FragmentStore,
    FrameAgeLimit,
    FrameId,
    NeverEvict,
    OffsetDiscipline,
    OffsetReassembler,
    Outcome,
};

fn store_with_frames(frames: &[u32]) -> FragmentStore {
    let mut store = FragmentStore::new();
    for (id, &frame) in (1_u16..).zip(frames) {
        store.get_or_create(&key(id), FrameId::new(frame));
    }
    store
}

#[test]
fn never_evict_keeps_everything() {
    let mut store = store_with_frames(&[1, 2, 3]);
    let evicted = store.sweep(FrameId::new(1_000_000), &key(9), &mut NeverEvict);
    assert!(evicted.is_empty());
    assert_eq!(store.len(), 3);
}

#[test]
fn capacity_limit_drops_oldest_first() {
    let mut store = store_with_frames(&[30, 10, 20]);
    let mut policy = CapacityLimit::new(NonZeroUsize::new(1).expect("non-zero"));

    let mut evicted = store.sweep(FrameId::new(40), &key(9), &mut policy);
    evicted.sort_by_key(|k| k.to_string());
    assert_eq!(evicted, vec![key(2), key(3)]);
    assert!(store.lookup(&key(1)).is_some());
}

#[test]
fn capacity_limit_spares_the_incoming_key() {
    let mut store = store_with_frames(&[10, 20, 30]);
    let mut policy = CapacityLimit::new(NonZeroUsize::new(1).expect("non-zero"));

    let evicted = store.sweep(FrameId::new(40), &key(1), &mut policy);
    assert_eq!(evicted, vec![key(2)]);
    assert!(store.lookup(&key(1)).is_some());
    assert!(store.lookup(&key(3)).is_some());
}

#[test]
fn oldest_key_keeps_reassembling_under_capacity_pressure() {
    let eviction = EvictionConfig::Capacity(NonZeroUsize::new(1).expect("non-zero"));
    let mut reassembler = OffsetReassembler::with_eviction(OffsetDiscipline, eviction.build());
    reassembler.add_fragment(&key(1), at(0, b"ab", false, 1));
    reassembler.add_fragment(&key(2), at(0, b"xy", false, 2));

    let outcome = reassembler.add_fragment(&key(1), at(2, b"cd", true, 3));
    let Outcome::Complete(message) = &outcome else {
        panic!("fed key must not be evicted, got {outcome:?}");
    };
    assert_eq!(message.payload().as_ref(), b"abcd");
    assert_eq!(reassembler.store().len(), 2);
}

#[test]
fn frame_age_limit_drops_idle_entries() {
    let mut store = store_with_frames(&[1, 50]);
    let mut policy = FrameAgeLimit::new(NonZeroU32::new(10).expect("non-zero"));

    let evicted = store.sweep(FrameId::new(55), &key(9), &mut policy);
    assert_eq!(evicted, vec![key(1)]);
    assert_eq!(store.len(), 1);
}

#[rstest]
#[case(EvictionConfig::Never, 2)]
#[case(EvictionConfig::FrameAge(NonZeroU32::new(5).expect("non-zero")), 1)]
fn configured_policy_applies_before_each_fragment(
    #[case] eviction: EvictionConfig,
    #[case] expected_entries: usize,
) {
    let mut reassembler = OffsetReassembler::with_eviction(OffsetDiscipline, eviction.build());
    reassembler.add_fragment(&key(1), at(0, b"ab", false, 1));
    reassembler.add_fragment(&key(2), at(0, b"ab", false, 100));
    assert_eq!(reassembler.store().len(), expected_entries);
}

#[test]
fn evicted_key_starts_over() {
    let eviction = EvictionConfig::FrameAge(NonZeroU32::new(5).expect("non-zero"));
    let mut reassembler = OffsetReassembler::with_eviction(OffsetDiscipline, eviction.build());
    reassembler.add_fragment(&key(1), at(0, b"ab", false, 1));

    let outcome = reassembler.add_fragment(&key(1), at(2, b"cd", true, 50));
    assert_eq!(outcome, Outcome::Pending);
    assert_eq!(
        reassembler.lookup(&key(1)).map(|r| r.first_frame()),
        Some(FrameId::new(50))
    );
}
