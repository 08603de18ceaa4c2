use crate::codec;
use crate::config::ChannelConfig;
use crate::constants::MAX_PACKET_SIZE;
use crate::error::{Error, ErrorKind, Result};
use crate::net::socket::Socket;
use crate::net::{EchoResponse, Network};
use crate::types::Sequence;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tracing::instrument;

/// A channel for sending echo requests to, and receiving echo replies from, a single target.
///
/// The underlying socket is owned by the channel and closed when the channel is dropped.
pub struct Channel<S: Socket> {
    target_addr: Ipv4Addr,
    socket: S,
}

impl<S: Socket> Channel<S> {
    /// Create a `Channel`.
    ///
    /// If the read timeout cannot be configured the newly created socket is dropped before the
    /// error is returned.
    ///
    /// This operation requires the `CAP_NET_RAW` capability on Linux.
    #[instrument(skip_all, level = "trace")]
    pub fn connect(config: &ChannelConfig) -> Result<Self> {
        tracing::debug!(?config);
        let mut socket = S::new_icmp_socket_ipv4()?;
        socket.set_read_timeout(config.read_timeout)?;
        Ok(Self {
            target_addr: config.target_addr,
            socket,
        })
    }
}

impl<S: Socket> Network for Channel<S> {
    #[instrument(skip(self), level = "trace")]
    fn send_echo_request(&mut self, sequence: Sequence) -> Result<()> {
        let packet = codec::build_echo_request(sequence)?;
        let remote_addr = SocketAddr::new(IpAddr::V4(self.target_addr), 0);
        self.socket.send_to(&packet, remote_addr)?;
        Ok(())
    }

    #[instrument(skip(self), level = "trace")]
    fn recv_echo_reply(&mut self, sequence: Sequence) -> Result<EchoResponse> {
        let mut buf = [0_u8; MAX_PACKET_SIZE];
        match self.socket.recv_from(&mut buf) {
            Ok((0, _)) => Err(Error::ConnectionClosed),
            Ok((bytes_read, addr)) => {
                let response = if codec::validate_echo_reply(&buf[..bytes_read], sequence) {
                    EchoResponse::Reply(addr.map(|addr| addr.ip()))
                } else {
                    EchoResponse::Rejected
                };
                tracing::debug!(?response);
                Ok(response)
            }
            Err(err) => match err.kind() {
                ErrorKind::Timeout => Ok(EchoResponse::Timeout),
                ErrorKind::Std(_) => Err(Error::IoError(err)),
            },
        }
    }
}
