use bytes::{Bytes, BytesMut};

/// Transmit path of the link a [`Connection`] runs on
///
/// Implemented by the surrounding link layer. Buffers are a scarce shared resource; the engine
/// never drops a reply for lack of one but waits for a later [`Connection::run`].
///
/// [`Connection`]: crate::Connection
/// [`Connection::run`]: crate::Connection::run
pub trait Transmit {
    /// Whether a transmit buffer could be allocated right now
    fn tx_alloc_peek(&self) -> bool;

    /// Allocate a transmit buffer for one control PDU
    fn tx_alloc(&mut self) -> Option<BytesMut>;

    /// Queue an encoded control PDU for transmission
    fn tx_enqueue(&mut self, pdu: Bytes);
}

