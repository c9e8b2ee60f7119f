//! Segment and fragment reassembly shared by the network and transport layers.
//!
//! This module collects the engine's domain types. Each sub-module focuses on
//! a single concept: keys, fragments, the keyed store, gap analysis, the two
//! addressing disciplines, eviction, and publishing completed messages.

pub mod discipline;
pub mod engine;
pub mod error;
pub mod eviction;
pub mod fragment;
pub mod gap;
pub mod key;
pub mod publish;
pub mod store;

pub use discipline::{OffsetDiscipline, ReassemblyDiscipline, SequenceDiscipline};
pub use engine::{OffsetReassembler, Outcome, Reassembler, SequenceReassembler};
pub use error::Reason;
pub use eviction::{CapacityLimit, EvictionConfig, EvictionPolicy, FrameAgeLimit, NeverEvict};
pub use fragment::{Fragment, FrameId, Placement};
pub use gap::{Admission, Coverage, GapAnalyzer};
pub use key::{EndpointAddress, FragmentKey, KeySpace, KeySynthesizer, MessageRef};
pub use publish::{CompletionPublisher, ReassembledMessage, SegmentSummary};
pub use store::{FragmentStore, Reassembly, ReassemblyStatus};
