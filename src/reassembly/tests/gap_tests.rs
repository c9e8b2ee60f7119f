//! Tests for fragment admission and coverage analysis.

use rstest::rstest;

use super::{at, key, seq};
use crate::reassembly::{
    Admission,
    Fragment,
    FragmentStore,
    FrameId,
    GapAnalyzer,
    Reason,
    Reassembly,
};

fn reassembly_with(store: &mut FragmentStore, fragments: &[Fragment]) -> Reassembly {
    let reassembly = store.get_or_create(&key(1), FrameId::new(1));
    for fragment in fragments {
        if let Some(total) = fragment.total_length() {
            reassembly.set_total_length(total);
        }
        reassembly.record(fragment.clone());
    }
    reassembly.clone()
}

#[test]
fn fresh_fragment_is_accepted() {
    let mut store = FragmentStore::new();
    let reassembly = reassembly_with(&mut store, &[at(0, b"abcd", false, 1)]);

    let admission = GapAnalyzer::admit_offset(&reassembly, &at(4, b"efgh", true, 2));
    assert_eq!(admission, Ok(Admission::Accepted));
}

#[test]
fn identical_overlap_is_benign() {
    let mut store = FragmentStore::new();
    let reassembly = reassembly_with(&mut store, &[at(0, b"abcdef", false, 1)]);

    let admission = GapAnalyzer::admit_offset(&reassembly, &at(2, b"cd", false, 2));
    assert_eq!(admission, Ok(Admission::OverlapBenign));
}

#[test]
fn differing_overlap_conflicts_at_first_differing_byte() {
    let mut store = FragmentStore::new();
    let reassembly = reassembly_with(&mut store, &[at(0, b"abcdef", false, 1)]);

    let admission = GapAnalyzer::admit_offset(&reassembly, &at(3, b"dXf", false, 2));
    assert_eq!(
        admission,
        Err(Reason::OverlapConflict {
            at: 4,
            frame: FrameId::new(1),
        })
    );
}

#[test]
fn fragment_past_declared_total_is_too_long() {
    let mut store = FragmentStore::new();
    let declared = at(0, b"ab", false, 1).with_total_length(4);
    let reassembly = reassembly_with(&mut store, &[declared]);

    let admission = GapAnalyzer::admit_offset(&reassembly, &at(2, b"cde", true, 2));
    assert_eq!(admission, Err(Reason::TooLongSegment { end: 5, bound: 4 }));
}

#[test]
fn fragment_past_its_own_declared_total_is_too_long() {
    let mut store = FragmentStore::new();
    let empty = reassembly_with(&mut store, &[]);

    let oversized = at(0, b"abcdef", true, 1).with_total_length(3);
    let admission = GapAnalyzer::admit_offset(&empty, &oversized);
    assert_eq!(admission, Err(Reason::TooLongSegment { end: 6, bound: 3 }));
}

#[test]
fn fragment_past_tail_end_is_too_long() {
    let mut store = FragmentStore::new();
    let reassembly = reassembly_with(&mut store, &[at(4, b"ef", true, 1)]);

    let admission = GapAnalyzer::admit_offset(&reassembly, &at(5, b"fg", false, 2));
    assert_eq!(admission, Err(Reason::TooLongSegment { end: 7, bound: 6 }));
}

#[test]
fn tail_ending_before_held_bytes_is_too_long() {
    let mut store = FragmentStore::new();
    let reassembly = reassembly_with(&mut store, &[at(4, b"efgh", false, 1)]);

    let admission = GapAnalyzer::admit_offset(&reassembly, &at(0, b"abcd", true, 2));
    assert_eq!(admission, Err(Reason::TooLongSegment { end: 8, bound: 4 }));
}

#[test]
fn second_distinct_tail_is_rejected() {
    let mut store = FragmentStore::new();
    let reassembly = reassembly_with(&mut store, &[at(4, b"ef", true, 3)]);

    let admission = GapAnalyzer::admit_offset(&reassembly, &at(2, b"cdef", true, 4));
    assert_eq!(
        admission,
        Err(Reason::MultipleTails {
            first: FrameId::new(3),
        })
    );
}

#[test]
fn repeated_identical_tail_is_benign() {
    let mut store = FragmentStore::new();
    let reassembly = reassembly_with(&mut store, &[at(4, b"ef", true, 3)]);

    let admission = GapAnalyzer::admit_offset(&reassembly, &at(4, b"ef", true, 9));
    assert_eq!(admission, Ok(Admission::OverlapBenign));
}

#[rstest]
#[case::gap_past_new_tail(&[(0, b"aa"), (4, b"cc")], at(0, b"aa", true, 4), 6, 2)]
#[case::held_past_new_tail(&[(0, b"aa"), (2, b"bb"), (4, b"cc")], at(2, b"bb", true, 4), 6, 4)]
fn tail_repeating_held_bytes_must_bound_them(
    #[case] held: &[(u32, &[u8; 2])],
    #[case] tail: Fragment,
    #[case] end: usize,
    #[case] bound: usize,
) {
    let fragments: Vec<_> = held
        .iter()
        .zip(1..)
        .map(|(&(offset, payload), frame)| at(offset, payload, false, frame))
        .collect();
    let mut store = FragmentStore::new();
    let reassembly = reassembly_with(&mut store, &fragments);

    let admission = GapAnalyzer::admit_offset(&reassembly, &tail);
    assert_eq!(admission, Err(Reason::TooLongSegment { end, bound }));
}

#[test]
fn tail_repeating_held_bytes_within_its_end_is_benign() {
    let mut store = FragmentStore::new();
    let reassembly = reassembly_with(&mut store, &[at(0, b"ab", false, 1)]);

    let admission = GapAnalyzer::admit_offset(&reassembly, &at(0, b"ab", true, 2));
    assert_eq!(admission, Ok(Admission::OverlapBenign));
}

#[test]
fn offset_analysis_refuses_arrival_ordered_fragments() {
    let mut store = FragmentStore::new();
    let reassembly = reassembly_with(&mut store, &[]);

    let admission = GapAnalyzer::admit_offset(&reassembly, &seq(b"ab", false, 1));
    assert_eq!(admission, Err(Reason::PlacementMismatch));
}

#[test]
fn sequence_analysis_allows_one_tail() {
    let mut store = FragmentStore::new();
    let reassembly = reassembly_with(&mut store, &[seq(b"ab", false, 1), seq(b"cd", true, 2)]);

    let admission = GapAnalyzer::admit_sequence(&reassembly, &seq(b"ef", true, 3));
    assert_eq!(
        admission,
        Err(Reason::MultipleTails {
            first: FrameId::new(2),
        })
    );
}

#[rstest]
#[case::gap_before_tail(&[(0, 2, false), (4, 2, true)], 2, 6, false)]
#[case::tiled(&[(0, 2, false), (2, 2, false), (4, 2, true)], 6, 6, true)]
#[case::overlapping(&[(0, 4, false), (2, 4, true)], 6, 6, true)]
#[case::no_tail(&[(0, 3, false), (3, 3, false)], 6, 6, false)]
#[case::empty_message(&[(0, 0, true)], 0, 0, true)]
fn coverage_and_completion(
    #[case] layout: &[(u32, usize, bool)],
    #[case] contiguous_to: usize,
    #[case] furthest: usize,
    #[case] complete: bool,
) {
    let fragments: Vec<_> = layout
        .iter()
        .zip(1..)
        .map(|(&(offset, len, tail), frame)| {
            let start = offset as usize;
            let payload: Vec<u8> = (start..start + len).map(|i| i as u8).collect();
            at(offset, &payload, tail, frame)
        })
        .collect();
    let mut store = FragmentStore::new();
    let reassembly = reassembly_with(&mut store, &fragments);

    let coverage = GapAnalyzer::coverage(reassembly.fragments());
    assert_eq!(coverage.contiguous_to, contiguous_to);
    assert_eq!(coverage.furthest, furthest);
    assert_eq!(GapAnalyzer::offset_complete(&reassembly), complete);
}

#[test]
fn sequence_completes_on_tail_only() {
    let mut store = FragmentStore::new();
    let open = reassembly_with(&mut store, &[seq(b"ab", false, 1)]);
    assert!(!GapAnalyzer::sequence_complete(&open));

    let mut store = FragmentStore::new();
    let closed = reassembly_with(&mut store, &[seq(b"ab", false, 1), seq(b"c", true, 2)]);
    assert!(GapAnalyzer::sequence_complete(&closed));
}
