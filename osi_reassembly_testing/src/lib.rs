//! Shared fixtures for exercising `osi_reassembly` in tests.
//!
//! Builders here construct keys, fragments and decoded units with terse
//! defaults, and [`LoggerHandle`] serialises access to the global log
//! capture.
//!
//! ```rust
//! use osi_reassembly::reassembly::{OffsetReassembler, Outcome};
//! use osi_reassembly_testing::{network_key, offset_fragment};
//!
//! let mut reassembler = OffsetReassembler::offset();
//! let outcome = reassembler.add_fragment(&network_key(1), offset_fragment(0, b"ab", true, 1));
//! assert!(matches!(outcome, Outcome::Complete(_)));
//! ```

pub mod fixtures;
pub mod logging;
pub mod macros;

pub use fixtures::{
    ClnpSegmentBuilder,
    address,
    cotp_unit,
    network_key,
    offset_fragment,
    sequence_fragment,
    transport_key,
};
pub use logging::{LoggerHandle, logger};
