use crate::error::Result;
use crate::types::Sequence;
use std::net::IpAddr;

/// Platform specific network code.
mod platform;

/// A network socket.
pub mod socket;

/// A channel for sending echo requests and receiving echo replies.
pub mod channel;

/// The platform specific socket type.
pub use platform::SocketImpl;

/// The outcome of waiting for a single echo reply.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum EchoResponse {
    /// The expected echo reply arrived, from the given address if known.
    Reply(Option<IpAddr>),
    /// Nothing arrived before the receive timeout expired.
    Timeout,
    /// A packet arrived but it was not the expected echo reply.
    Rejected,
}

/// An abstraction over a network interface for echo probing.
#[cfg_attr(test, mockall::automock)]
pub trait Network {
    /// Send an echo request with the given sequence number.
    fn send_echo_request(&mut self, sequence: Sequence) -> Result<()>;

    /// Wait, for at most the receive timeout, for the echo reply to `sequence`.
    ///
    /// Returns an error if the read failed for any reason other than a timeout, or if the socket
    /// reported a zero length read.
    fn recv_echo_reply(&mut self, sequence: Sequence) -> Result<EchoResponse>;
}
