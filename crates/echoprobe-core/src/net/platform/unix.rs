use crate::error::{ErrorKind, IoError, IoOperation, IoResult};
use crate::net::socket::Socket;
use itertools::Itertools;
use nix::errno::Errno;
use socket2::{Domain, Protocol, SockAddr, Type};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::instrument;

/// A raw `ICMPv4` socket backed by [`socket2`].
///
/// Creating this socket requires the `CAP_NET_RAW` capability on Linux.
pub struct SocketImpl {
    inner: socket2::Socket,
}

impl SocketImpl {
    fn new_raw_ipv4(protocol: Protocol) -> IoResult<Self> {
        Ok(Self {
            inner: socket2::Socket::new(Domain::IPV4, Type::RAW, Some(protocol))
                .map_err(|err| IoError::Other(err, IoOperation::NewSocket))?,
        })
    }
}

impl Socket for SocketImpl {
    #[instrument(level = "trace")]
    fn new_icmp_socket_ipv4() -> IoResult<Self> {
        Self::new_raw_ipv4(Protocol::ICMPV4)
    }
    #[instrument(skip(self), level = "trace")]
    fn set_read_timeout(&mut self, timeout: Duration) -> IoResult<()> {
        self.inner
            .set_read_timeout(Some(timeout))
            .map_err(|err| IoError::Other(err, IoOperation::SetReadTimeout))
    }
    #[instrument(skip(self, buf), level = "trace")]
    fn send_to(&mut self, buf: &[u8], addr: SocketAddr) -> IoResult<()> {
        tracing::trace!(buf = format!("{:02x?}", buf.iter().format(" ")), ?addr);
        self.inner
            .send_to(buf, &SockAddr::from(addr))
            .map_err(|err| IoError::SendTo(err, addr))?;
        Ok(())
    }
    #[instrument(skip(self, buf), level = "trace")]
    fn recv_from(&mut self, buf: &mut [u8]) -> IoResult<(usize, Option<SocketAddr>)> {
        let (bytes_read, addr) = self
            .inner
            .recv_from_into_buf(buf)
            .map_err(|err| IoError::Other(err, IoOperation::RecvFrom))?;
        tracing::trace!(
            buf = format!("{:02x?}", buf[..bytes_read].iter().format(" ")),
            bytes_read,
            ?addr
        );
        Ok((bytes_read, addr))
    }
}

impl From<&io::Error> for ErrorKind {
    fn from(value: &io::Error) -> Self {
        let errno = value.raw_os_error().map(Errno::from_raw);
        if errno == Some(Errno::EAGAIN)
            || errno == Some(Errno::EWOULDBLOCK)
            || errno == Some(Errno::ETIMEDOUT)
        {
            Self::Timeout
        } else {
            match value.kind() {
                io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => Self::Timeout,
                kind => Self::Std(kind),
            }
        }
    }
}

// only used for unit tests
impl From<ErrorKind> for io::Error {
    fn from(value: ErrorKind) -> Self {
        match value {
            ErrorKind::Timeout => Self::from(Errno::EAGAIN),
            ErrorKind::Std(kind) => Self::from(kind),
        }
    }
}

/// An extension trait to allow `recv_from` method which writes to a `&mut [u8]`.
///
/// This is required for `socket2::Socket` which [does not currently provide] this method.
///
/// [does not currently provide]: https://github.com/rust-lang/socket2/issues/223
trait RecvFrom {
    fn recv_from_into_buf(&self, buf: &mut [u8]) -> io::Result<(usize, Option<SocketAddr>)>;
}

impl RecvFrom for socket2::Socket {
    // Safety: the `recv` implementation promises not to write uninitialised
    // bytes to the `buf`fer, so this casting is safe.
    #![allow(unsafe_code)]
    fn recv_from_into_buf(&self, buf: &mut [u8]) -> io::Result<(usize, Option<SocketAddr>)> {
        let buf = unsafe {
            &mut *(std::ptr::from_mut::<[u8]>(buf) as *mut [std::mem::MaybeUninit<u8>])
        };
        self.recv_from(buf)
            .map(|(size, addr)| (size, addr.as_socket()))
    }
}
