//! Log output of the reassembly engine.
//!
//! Every test holds the [`LoggerHandle`] so captures from concurrent tests
//! cannot interleave.

use std::num::NonZeroUsize;

use log::Level;
use osi_reassembly::{
    ReassemblyConfig,
    ReassemblySession,
    reassembly::{CapacityLimit, OffsetDiscipline, OffsetReassembler, Outcome},
};
use osi_reassembly_testing::{LoggerHandle, logger, network_key, offset_fragment};
use rstest::rstest;

#[rstest]
fn rejection_logs_a_warning(mut logger: LoggerHandle) {
    let mut reassembler = OffsetReassembler::offset();
    let key = network_key(1);
    reassembler.add_fragment(&key, offset_fragment(0, b"abcd", false, 1));
    let outcome = reassembler.add_fragment(&key, offset_fragment(2, b"zz", false, 2));

    assert!(matches!(outcome, Outcome::Rejected(_)));
    assert!(
        logger.saw(Level::Warn, "reassembly abandoned"),
        "overlap conflict should be logged at warn"
    );
}

#[rstest]
fn completion_logs_at_debug(mut logger: LoggerHandle) {
    let mut reassembler = OffsetReassembler::offset();
    reassembler.add_fragment(&network_key(2), offset_fragment(0, b"ab", true, 1));

    assert!(logger.saw(Level::Debug, "reassembly complete"));
}

#[rstest]
fn eviction_logs_evicted_keys(mut logger: LoggerHandle) {
    let limit = NonZeroUsize::new(1).expect("non-zero");
    let mut reassembler =
        OffsetReassembler::with_eviction(OffsetDiscipline, Box::new(CapacityLimit::new(limit)));
    reassembler.add_fragment(&network_key(1), offset_fragment(0, b"a", false, 1));
    reassembler.add_fragment(&network_key(2), offset_fragment(0, b"b", false, 2));
    reassembler.add_fragment(&network_key(3), offset_fragment(0, b"c", false, 3));

    assert!(logger.saw(Level::Debug, "evicted reassemblies"));
}

#[rstest]
fn session_start_is_logged(mut logger: LoggerHandle) {
    let mut session = ReassemblySession::new(ReassemblyConfig::default());
    session.start();

    assert!(logger.saw(Level::Debug, "reassembly session started"));
}
