//! Tests for fragment keys, the key synthesizer and the keyed store.

use rstest::rstest;

use super::{at, key};
use crate::reassembly::{
    EndpointAddress,
    FragmentKey,
    FragmentStore,
    FrameId,
    KeySpace,
    KeySynthesizer,
    MessageRef,
    ReassemblyStatus,
};

fn endpoint(label: &'static [u8]) -> EndpointAddress { EndpointAddress::new(label) }

#[test]
fn keys_compare_structurally() {
    let a = FragmentKey::network(endpoint(b"x"), endpoint(b"y"), 9);
    let b = FragmentKey::network(endpoint(b"x"), endpoint(b"y"), 9);
    assert_eq!(a, b);
    assert_ne!(a, FragmentKey::network(endpoint(b"y"), endpoint(b"x"), 9));
}

#[test]
fn key_spaces_never_collide() {
    let network = FragmentKey::network(endpoint(b"x"), endpoint(b"y"), 5);
    let transport = FragmentKey::transport(endpoint(b"x"), endpoint(b"y"), 5);
    assert_ne!(network, transport);
    assert_eq!(network.space(), KeySpace::Network);
    assert_eq!(transport.space(), KeySpace::Transport);
}

#[rstest]
#[case(MessageRef::DataUnit(1), "clnp 78->79 du-id 1")]
#[case(
    MessageRef::Reference { reference: 0x10, generation: 2 },
    "cotp 78->79 dst-ref 16/2"
)]
#[case(MessageRef::Synthesized(3), "cotp 78->79 implicit #3")]
fn keys_display_for_logs(#[case] message: MessageRef, #[case] expected: &str) {
    let key = FragmentKey::new(endpoint(b"x"), endpoint(b"y"), message);
    assert_eq!(key.to_string(), expected);
}

#[test]
fn synthesizer_counts_and_resets() {
    let mut keys = KeySynthesizer::new();
    let first = keys.key_for(endpoint(b"x"), endpoint(b"y"));
    assert!(first.is_synthesized());
    keys.advance();
    keys.advance();
    assert_eq!(keys.current(), 2);
    assert_eq!(
        keys.key_for(endpoint(b"x"), endpoint(b"y")).message(),
        MessageRef::Synthesized(2)
    );
    keys.reset();
    assert_eq!(keys.key_for(endpoint(b"x"), endpoint(b"y")), first);
}

#[test]
fn reference_generations_advance_per_connection() {
    let mut keys = KeySynthesizer::new();
    let first = keys.reference_key(endpoint(b"x"), endpoint(b"y"), 5);
    assert_eq!(first, FragmentKey::transport(endpoint(b"x"), endpoint(b"y"), 5));

    keys.completed(&first);
    let second = keys.reference_key(endpoint(b"x"), endpoint(b"y"), 5);
    assert_eq!(
        second,
        FragmentKey::transport_generation(endpoint(b"x"), endpoint(b"y"), 5, 1)
    );
    assert_eq!(
        keys.reference_key(endpoint(b"x"), endpoint(b"y"), 6).message(),
        MessageRef::Reference {
            reference: 6,
            generation: 0,
        }
    );
    assert_eq!(keys.current(), 0);

    keys.completed(&FragmentKey::network(endpoint(b"x"), endpoint(b"y"), 5));
    assert_eq!(keys.generation(&endpoint(b"x"), &endpoint(b"y"), 5), 1);

    keys.reset();
    assert_eq!(keys.reference_key(endpoint(b"x"), endpoint(b"y"), 5), first);
}

#[test]
fn get_or_create_never_duplicates() {
    let mut store = FragmentStore::new();
    store.get_or_create(&key(1), FrameId::new(1)).record(at(0, b"ab", false, 1));
    let again = store.get_or_create(&key(1), FrameId::new(2));
    assert_eq!(again.fragments().len(), 1);
    assert_eq!(again.first_frame(), FrameId::new(1));
    assert_eq!(store.len(), 1);
}

#[test]
fn fresh_entry_is_in_progress_and_empty() {
    let mut store = FragmentStore::new();
    let entry = store.get_or_create(&key(2), FrameId::new(4));
    assert_eq!(entry.status(), ReassemblyStatus::InProgress);
    assert!(entry.fragments().is_empty());
    assert_eq!(entry.total_length(), None);
    assert_eq!(entry.completed_in(), None);
}

#[test]
fn reset_is_idempotent() {
    let mut store = FragmentStore::new();
    store.get_or_create(&key(3), FrameId::new(1));
    store.reset();
    store.reset();
    assert!(store.is_empty());
    assert!(store.lookup(&key(3)).is_none());
}

#[test]
fn terminal_statuses() {
    assert!(!ReassemblyStatus::InProgress.is_terminal());
    assert!(ReassemblyStatus::Complete.is_terminal());
    assert!(
        ReassemblyStatus::Error(crate::reassembly::Reason::PlacementMismatch).is_terminal()
    );
}
