//! Metric helpers for `osi_reassembly`.
//!
//! This module defines metric names and simple helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. Without the `metrics` feature
//! the helpers compile to no-ops.

#[cfg(feature = "metrics")]
use metrics::counter;

use crate::reassembly::Reason;

/// Name of the counter tracking fragments fed to a reassembler.
pub const FRAGMENTS_TOTAL: &str = "osi_reassembly_fragments_total";
/// Name of the counter tracking completed reassemblies.
pub const COMPLETED_TOTAL: &str = "osi_reassembly_completed_total";
/// Name of the counter tracking rejected fragments and abandoned reassemblies.
pub const REJECTED_TOTAL: &str = "osi_reassembly_rejected_total";
/// Name of the counter tracking evicted store entries.
pub const EVICTED_TOTAL: &str = "osi_reassembly_evicted_total";

/// Record a fragment fed to the `discipline` reassembler.
pub fn inc_fragments(discipline: &'static str) {
    #[cfg(feature = "metrics")]
    counter!(FRAGMENTS_TOTAL, "discipline" => discipline).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = discipline;
}

/// Record a completed reassembly.
pub fn inc_completed(discipline: &'static str) {
    #[cfg(feature = "metrics")]
    counter!(COMPLETED_TOTAL, "discipline" => discipline).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = discipline;
}

/// Record a rejection for `reason`.
pub fn inc_rejected(discipline: &'static str, reason: Reason) {
    #[cfg(feature = "metrics")]
    counter!(REJECTED_TOTAL, "discipline" => discipline, "reason" => reason.label()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = (discipline, reason);
}

/// Record `count` evicted entries.
pub fn inc_evicted(count: usize) {
    #[cfg(feature = "metrics")]
    counter!(EVICTED_TOTAL).increment(u64::try_from(count).unwrap_or(u64::MAX));
    #[cfg(not(feature = "metrics"))]
    let _ = count;
}
