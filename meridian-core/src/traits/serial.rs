//! Serial link abstractions

use core::future::Future;

/// Source of received protocol bytes
///
/// The firmware backs this with the UART receive buffer; tests back it with
/// a fixed byte string.
pub trait ByteSource {
    /// Wait for the next received byte
    ///
    /// Returns `None` once the source is closed. A live serial link never
    /// closes.
    fn next_byte(&mut self) -> impl Future<Output = Option<u8>>;
}

/// Destination for protocol replies
///
/// Implementations own the transport and report their own write failures;
/// the protocol session never retries a reply.
pub trait ReplySink {
    /// Send one complete reply
    fn send(&mut self, reply: &str) -> impl Future<Output = ()>;
}
