use crate::error::IoResult as Result;
use std::net::SocketAddr;
use std::time::Duration;

/// A raw `ICMPv4` socket.
///
/// The socket is closed when dropped.
#[cfg_attr(test, mockall::automock)]
pub trait Socket
where
    Self: Sized,
{
    /// Create a raw IPv4 socket for sending and receiving `ICMP` echo packets.
    fn new_icmp_socket_ipv4() -> Result<Self>;
    /// Bound every subsequent `recv_from` to at most `timeout`.
    fn set_read_timeout(&mut self, timeout: Duration) -> Result<()>;
    fn send_to(&mut self, buf: &[u8], addr: SocketAddr) -> Result<()>;
    /// Receive a single datagram, including its `IPv4` header.
    fn recv_from(&mut self, buf: &mut [u8]) -> Result<(usize, Option<SocketAddr>)>;
}
