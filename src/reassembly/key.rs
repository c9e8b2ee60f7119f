//! Keys grouping fragments of one in-flight logical message.
//!
//! A [`FragmentKey`] pairs the communicating endpoints with a
//! protocol-scoped [`MessageRef`]. The variant of the reference doubles as
//! the protocol discriminator, so network-layer and transport-layer keys can
//! never collide even for identical endpoints and numbers.

use std::{collections::HashMap, fmt};

use bytes::Bytes;
use derive_more::{Display, From};

/// Opaque network address of one endpoint (for example an NSAP).
#[derive(Clone, Debug, PartialEq, Eq, Hash, From)]
pub struct EndpointAddress(Bytes);

impl EndpointAddress {
    /// Wrap raw address bytes.
    #[must_use]
    pub fn new(bytes: impl Into<Bytes>) -> Self { Self(bytes.into()) }

    /// Borrow the raw address bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] { &self.0 }
}

impl fmt::Display for EndpointAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0.iter() {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Key space a fragment key belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum KeySpace {
    /// Network-layer segmentation keyed by data-unit identifier.
    #[display("clnp")]
    Network,
    /// Transport-layer continuation keyed by connection reference.
    #[display("cotp")]
    Transport,
}

/// Protocol-scoped identifier of one logical message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum MessageRef {
    /// Data-unit identifier shared by every segment of one network datagram.
    #[display("du-id {_0}")]
    DataUnit(u16),
    /// Destination reference of a transport connection, and which of the
    /// connection's successive messages this is.
    #[display("dst-ref {reference}/{generation}")]
    Reference {
        /// Destination reference carried on the wire.
        reference: u16,
        /// Count of messages already completed on the connection.
        generation: u32,
    },
    /// Counter standing in for a connection reference the wire omits.
    #[display("implicit #{_0}")]
    Synthesized(u32),
}

impl MessageRef {
    /// Key space the reference is scoped to.
    #[must_use]
    pub const fn space(self) -> KeySpace {
        match self {
            Self::DataUnit(_) => KeySpace::Network,
            Self::Reference { .. } | Self::Synthesized(_) => KeySpace::Transport,
        }
    }
}

/// Identifies one in-flight logical message.
///
/// Equality and hashing are purely structural.
///
/// # Examples
///
/// ```
/// use osi_reassembly::reassembly::{EndpointAddress, FragmentKey, KeySpace};
///
/// let key = FragmentKey::network(
///     EndpointAddress::new(&b"\x49\x00\x01"[..]),
///     EndpointAddress::new(&b"\x49\x00\x02"[..]),
///     0x1234,
/// );
/// assert_eq!(key.space(), KeySpace::Network);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FragmentKey {
    source: EndpointAddress,
    destination: EndpointAddress,
    message: MessageRef,
}

impl FragmentKey {
    /// Build a key from its parts.
    #[must_use]
    pub const fn new(
        source: EndpointAddress,
        destination: EndpointAddress,
        message: MessageRef,
    ) -> Self {
        Self {
            source,
            destination,
            message,
        }
    }

    /// Key for a network-layer datagram identified by `data_unit_id`.
    #[must_use]
    pub const fn network(
        source: EndpointAddress,
        destination: EndpointAddress,
        data_unit_id: u16,
    ) -> Self {
        Self::new(source, destination, MessageRef::DataUnit(data_unit_id))
    }

    /// Key for the first message on a transport connection with an explicit
    /// destination reference.
    #[must_use]
    pub const fn transport(
        source: EndpointAddress,
        destination: EndpointAddress,
        reference: u16,
    ) -> Self {
        Self::transport_generation(source, destination, reference, 0)
    }

    /// Key for message number `generation` on a referenced transport connection.
    #[must_use]
    pub const fn transport_generation(
        source: EndpointAddress,
        destination: EndpointAddress,
        reference: u16,
        generation: u32,
    ) -> Self {
        Self::new(
            source,
            destination,
            MessageRef::Reference {
                reference,
                generation,
            },
        )
    }

    /// Source endpoint.
    #[must_use]
    pub const fn source(&self) -> &EndpointAddress { &self.source }

    /// Destination endpoint.
    #[must_use]
    pub const fn destination(&self) -> &EndpointAddress { &self.destination }

    /// Protocol-scoped message identifier.
    #[must_use]
    pub const fn message(&self) -> MessageRef { self.message }

    /// Key space of this key.
    #[must_use]
    pub const fn space(&self) -> KeySpace { self.message.space() }

    /// Whether the message identifier was synthesized rather than read off the wire.
    #[must_use]
    pub const fn is_synthesized(&self) -> bool {
        matches!(self.message, MessageRef::Synthesized(_))
    }
}

impl fmt::Display for FragmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}->{} {}",
            self.space(),
            self.source,
            self.destination,
            self.message
        )
    }
}

/// Produces stable keys for transport messages.
///
/// Connections that carry no reference share one counter, advanced once per
/// completed message. Referenced connections reuse their reference for every
/// message, so each `(source, destination, reference)` triple has its own
/// generation, bumped when a message on it completes. Both are reset at the
/// same session boundary as the fragment store. Grouping by counter assumes
/// the connection's units are processed in transmission order; it is a
/// heuristic, not a protocol guarantee.
///
/// # Examples
///
/// ```
/// use osi_reassembly::reassembly::{EndpointAddress, KeySynthesizer, MessageRef};
///
/// let mut keys = KeySynthesizer::new();
/// let src = EndpointAddress::new(&b"a"[..]);
/// let dst = EndpointAddress::new(&b"b"[..]);
/// assert_eq!(keys.key_for(src.clone(), dst.clone()).message(), MessageRef::Synthesized(0));
/// keys.advance();
/// assert_eq!(keys.key_for(src.clone(), dst.clone()).message(), MessageRef::Synthesized(1));
///
/// let first = keys.reference_key(src.clone(), dst.clone(), 9);
/// keys.completed(&first);
/// assert_eq!(
///     keys.reference_key(src, dst, 9).message(),
///     MessageRef::Reference { reference: 9, generation: 1 }
/// );
/// ```
#[derive(Clone, Debug, Default)]
pub struct KeySynthesizer {
    next: u32,
    generations: HashMap<(EndpointAddress, EndpointAddress, u16), u32>,
}

impl KeySynthesizer {
    /// Create a synthesizer starting at zero.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Key for the connection currently identified by the counter.
    #[must_use]
    pub fn key_for(&self, source: EndpointAddress, destination: EndpointAddress) -> FragmentKey {
        FragmentKey::new(source, destination, MessageRef::Synthesized(self.next))
    }

    /// Key for the current message on a connection named by `reference`.
    #[must_use]
    pub fn reference_key(
        &self,
        source: EndpointAddress,
        destination: EndpointAddress,
        reference: u16,
    ) -> FragmentKey {
        let generation = self.generation(&source, &destination, reference);
        FragmentKey::transport_generation(source, destination, reference, generation)
    }

    /// Messages already completed on the connection named by `reference`.
    #[must_use]
    pub fn generation(
        &self,
        source: &EndpointAddress,
        destination: &EndpointAddress,
        reference: u16,
    ) -> u32 {
        self.generations
            .get(&(source.clone(), destination.clone(), reference))
            .copied()
            .unwrap_or(0)
    }

    /// Current counter value.
    #[must_use]
    pub const fn current(&self) -> u32 { self.next }

    /// Move on to the next implicit connection.
    pub fn advance(&mut self) { self.next = self.next.wrapping_add(1); }

    /// Note that `key`'s message completed, so the next message gets a fresh key.
    ///
    /// Network-layer keys are left alone.
    pub fn completed(&mut self, key: &FragmentKey) {
        match key.message() {
            MessageRef::Synthesized(_) => self.advance(),
            MessageRef::Reference { reference, .. } => {
                let generation = self
                    .generations
                    .entry((key.source().clone(), key.destination().clone(), reference))
                    .or_insert(0);
                *generation = generation.wrapping_add(1);
            }
            MessageRef::DataUnit(_) => {}
        }
    }

    /// Restart numbering for a new session.
    pub fn reset(&mut self) {
        self.next = 0;
        self.generations.clear();
    }
}
