//! Assertion macros shared by unit and integration tests.

/// Unwrap an [`Outcome::Complete`](osi_reassembly::reassembly::Outcome::Complete)
/// or panic with the actual outcome and call site.
#[macro_export]
macro_rules! expect_complete {
    ($outcome:expr) => {{
        match $outcome {
            ::osi_reassembly::reassembly::Outcome::Complete(message) => message,
            other => panic!(
                "expected a completed reassembly at {}:{}, got {other:?}",
                file!(),
                line!()
            ),
        }
    }};
}

pub use crate::expect_complete;
