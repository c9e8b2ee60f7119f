#![cfg(feature = "metrics")]
//! Tests for `osi_reassembly` metrics.
//!
//! These tests drive reassemblers under a local
//! `metrics_util::debugging::DebuggingRecorder` and inspect the counters.
use std::num::NonZeroUsize;

use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
use osi_reassembly::{
    metrics::{COMPLETED_TOTAL, EVICTED_TOTAL, FRAGMENTS_TOTAL, REJECTED_TOTAL},
    reassembly::{
        CapacityLimit,
        Fragment,
        KeySynthesizer,
        OffsetDiscipline,
        OffsetReassembler,
        SequenceReassembler,
    },
};
use osi_reassembly_testing::{network_key, offset_fragment, sequence_fragment, transport_key};
use rstest::rstest;

/// Creates a debugging recorder and snapshotter for metrics testing.
fn debugging_recorder_setup() -> (Snapshotter, DebuggingRecorder) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    (snapshotter, recorder)
}

fn counter(snapshotter: &Snapshotter, name: &str, label: Option<(&str, &str)>) -> u64 {
    snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .filter(|(key, _, _, _)| {
            key.key().name() == name
                && label.is_none_or(|(k, v)| {
                    key.key().labels().any(|l| l.key() == k && l.value() == v)
                })
        })
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(c) => c,
            _ => 0,
        })
        .sum()
}

#[test]
fn completed_offset_message_counts_fragments_and_completion() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        let mut reassembler = OffsetReassembler::offset();
        let key = network_key(1);
        reassembler.add_fragment(&key, offset_fragment(2, b"cd", true, 1));
        reassembler.add_fragment(&key, offset_fragment(0, b"ab", false, 2));
    });

    assert_eq!(
        counter(&snapshotter, FRAGMENTS_TOTAL, Some(("discipline", "offset"))),
        2
    );
    assert_eq!(
        counter(&snapshotter, COMPLETED_TOTAL, Some(("discipline", "offset"))),
        1
    );
}

#[test]
fn sequence_completion_is_labelled() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        let mut reassembler = SequenceReassembler::sequence(KeySynthesizer::new());
        reassembler.add_fragment(&transport_key(3), sequence_fragment(b"only", true, 1));
    });

    assert_eq!(
        counter(&snapshotter, COMPLETED_TOTAL, Some(("discipline", "sequence"))),
        1
    );
}

#[rstest]
#[case::overlap_conflict(offset_fragment(2, b"X", false, 2), "overlap_conflict")]
#[case::multiple_tails(offset_fragment(0, b"ab", true, 2), "multiple_tails")]
#[case::placement_mismatch(sequence_fragment(b"x", false, 2), "placement_mismatch")]
fn rejection_reason_is_labelled(
    #[case] second: Fragment,
    #[case] reason: &str,
) {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        let mut reassembler = OffsetReassembler::offset();
        let key = network_key(4);
        reassembler.add_fragment(&key, offset_fragment(2, b"cd", true, 1));
        reassembler.add_fragment(&key, second);
    });

    assert_eq!(counter(&snapshotter, REJECTED_TOTAL, Some(("reason", reason))), 1);
}

#[test]
fn evictions_are_counted() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        let limit = NonZeroUsize::new(2).expect("non-zero");
        let mut reassembler = OffsetReassembler::with_eviction(
            OffsetDiscipline,
            Box::new(CapacityLimit::new(limit)),
        );
        for du_id in 1..=5u16 {
            reassembler.add_fragment(
                &network_key(du_id),
                offset_fragment(0, b"x", false, u32::from(du_id)),
            );
        }
    });

    assert_eq!(counter(&snapshotter, EVICTED_TOTAL, None), 2);
}
