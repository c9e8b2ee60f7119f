//! Coverage and anomaly analysis over one key's fragment set.
//!
//! [`GapAnalyzer`] decides whether a newly arriving fragment may join a
//! reassembly and whether the set it would then form covers the whole
//! message. It never mutates the reassembly; the engine applies its verdict.

use std::ops::Range;

use super::{Fragment, Reason, Reassembly};

/// Verdict for a fragment that may join the reassembly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    /// The fragment adds bytes not previously held.
    Accepted,
    /// The fragment overlaps held bytes with identical content.
    OverlapBenign,
}

/// Byte coverage of an offset-placed fragment set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Coverage {
    /// Exclusive end of the contiguous run starting at byte zero.
    pub contiguous_to: usize,
    /// Exclusive end of the furthest byte held.
    pub furthest: usize,
}

/// Stateless fragment admission and completion checks.
#[derive(Clone, Copy, Debug, Default)]
pub struct GapAnalyzer;

impl GapAnalyzer {
    /// Admit an offset-placed fragment.
    ///
    /// Checks run in a fixed order: range past the declared end, second
    /// tail, held bytes past a new tail's end, then overlap content. A tail
    /// repeating the held tail (same range, same bytes) is a benign overlap;
    /// a tail repeating a held non-tail fragment is a new tail and must
    /// still bound every held byte.
    ///
    /// # Errors
    ///
    /// Returns [`Reason::TooLongSegment`] when the fragment reaches past the
    /// declared total length or the tail's end, or when a tail ends before
    /// bytes already held; [`Reason::MultipleTails`] for a second, different
    /// tail; [`Reason::OverlapConflict`] when overlapping bytes differ; and
    /// [`Reason::PlacementMismatch`] for an arrival-ordered fragment.
    pub fn admit_offset(reassembly: &Reassembly, fragment: &Fragment) -> Result<Admission, Reason> {
        let Some(range) = fragment.range() else {
            return Err(Reason::PlacementMismatch);
        };

        if let Some(bound) = Self::message_end(reassembly, fragment) {
            if range.end > bound {
                return Err(Reason::TooLongSegment {
                    end: range.end,
                    bound,
                });
            }
        }

        if fragment.is_tail() {
            if let Some(tail) = reassembly.tail() {
                let repeats_tail =
                    tail.range() == Some(range.clone()) && tail.payload() == fragment.payload();
                if !repeats_tail {
                    return Err(Reason::MultipleTails {
                        first: tail.frame(),
                    });
                }
            }
            let furthest = Self::coverage(reassembly.fragments()).furthest;
            if furthest > range.end {
                return Err(Reason::TooLongSegment {
                    end: furthest,
                    bound: range.end,
                });
            }
        }

        let mut admission = Admission::Accepted;
        for held in reassembly.fragments() {
            let Some(held_range) = held.range() else {
                continue;
            };
            let Some(shared) = intersect(&range, &held_range) else {
                continue;
            };
            let incoming = &fragment.payload()[shared.start - range.start..shared.end - range.start];
            let existing =
                &held.payload()[shared.start - held_range.start..shared.end - held_range.start];
            if let Some(index) = first_difference(incoming, existing) {
                return Err(Reason::OverlapConflict {
                    at: shared.start + index,
                    frame: held.frame(),
                });
            }
            admission = Admission::OverlapBenign;
        }
        Ok(admission)
    }

    /// Admit an arrival-ordered fragment.
    ///
    /// Only the single-tail rule applies; there are no offsets to conflict on.
    ///
    /// # Errors
    ///
    /// Returns [`Reason::MultipleTails`] when a tail was already accepted and
    /// [`Reason::PlacementMismatch`] for an offset-placed fragment.
    pub fn admit_sequence(
        reassembly: &Reassembly,
        fragment: &Fragment,
    ) -> Result<Admission, Reason> {
        if fragment.range().is_some() {
            return Err(Reason::PlacementMismatch);
        }
        if fragment.is_tail() {
            if let Some(tail) = reassembly.tail() {
                return Err(Reason::MultipleTails {
                    first: tail.frame(),
                });
            }
        }
        Ok(Admission::Accepted)
    }

    /// Whether an offset-placed set covers `[0, end)` and includes its tail.
    #[must_use]
    pub fn offset_complete(reassembly: &Reassembly) -> bool {
        let Some(end) = reassembly.tail().and_then(|tail| tail.range()).map(|r| r.end) else {
            return false;
        };
        Self::coverage(reassembly.fragments()).contiguous_to >= end
    }

    /// Whether the most recently appended fragment is the tail.
    #[must_use]
    pub fn sequence_complete(reassembly: &Reassembly) -> bool {
        reassembly.fragments().last().is_some_and(Fragment::is_tail)
    }

    /// Compute byte coverage of the offset-placed fragments in `fragments`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bytes::Bytes;
    /// use osi_reassembly::reassembly::{Fragment, FrameId, GapAnalyzer};
    ///
    /// let fragments = [
    ///     Fragment::at_offset(0, Bytes::from_static(b"ab"), false, FrameId::new(1)),
    ///     Fragment::at_offset(4, Bytes::from_static(b"ef"), true, FrameId::new(2)),
    /// ];
    /// let coverage = GapAnalyzer::coverage(&fragments);
    /// assert_eq!(coverage.contiguous_to, 2);
    /// assert_eq!(coverage.furthest, 6);
    /// ```
    #[must_use]
    pub fn coverage(fragments: &[Fragment]) -> Coverage {
        let mut ranges: Vec<Range<usize>> = fragments.iter().filter_map(Fragment::range).collect();
        ranges.sort_by_key(|range| range.start);

        let mut coverage = Coverage::default();
        let mut gap_found = false;
        for range in ranges {
            if range.start > coverage.contiguous_to {
                gap_found = true;
            }
            if !gap_found {
                coverage.contiguous_to = coverage.contiguous_to.max(range.end);
            }
            coverage.furthest = coverage.furthest.max(range.end);
        }
        coverage
    }

    /// Message end implied so far: the tail's end, else the declared total.
    fn message_end(reassembly: &Reassembly, fragment: &Fragment) -> Option<usize> {
        let tail_end = reassembly
            .tail()
            .and_then(Fragment::range)
            .map(|range| range.end);
        let declared = reassembly
            .total_length()
            .or(fragment.total_length())
            .map(|total| total as usize);
        match (tail_end, declared) {
            (Some(tail), Some(total)) => Some(tail.min(total)),
            (tail, total) => tail.or(total),
        }
    }
}

fn intersect(a: &Range<usize>, b: &Range<usize>) -> Option<Range<usize>> {
    let start = a.start.max(b.start);
    let end = a.end.min(b.end);
    (start < end).then_some(start..end)
}

fn first_difference(a: &[u8], b: &[u8]) -> Option<usize> {
    a.iter().zip(b).position(|(x, y)| x != y)
}
