use std::fmt::{Display, Formatter};
use std::io;
use std::net::SocketAddr;
use thiserror::Error;

/// A probe error result.
pub type Result<T> = std::result::Result<T, Error>;

/// A probe error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid config: {0}")]
    BadConfig(String),
    #[error("a probe session is already active")]
    SessionActive,
    #[error("cannot resolve host <{0}>: {1}")]
    UnresolvedTarget(String, String),
    #[error("invalid packet: {0}")]
    PacketError(#[from] echoprobe_packet::error::Error),
    #[error("IO error: {0}")]
    IoError(#[from] IoError),
    #[error("connection closed")]
    ConnectionClosed,
    #[error("probe error: {0}")]
    Other(String),
}

/// Custom IO error result.
pub type IoResult<T> = std::result::Result<T, IoError>;

/// Custom IO error.
#[derive(Error, Debug)]
pub enum IoError {
    #[error("Sendto error for {1}: {0}")]
    SendTo(io::Error, SocketAddr),
    #[error("Failed to {1}: {0}")]
    Other(io::Error, IoOperation),
}

impl IoError {
    /// Get the custom error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SendTo(e, _) | Self::Other(e, _) => ErrorKind::from(e),
        }
    }
}

/// Custom error kind.
///
/// Distinguishes an expired receive timeout from all other failures, which are reported with
/// their standard [`io::ErrorKind`].
#[derive(Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Timeout,
    Std(io::ErrorKind),
}

/// Io operation.
#[derive(Debug)]
pub enum IoOperation {
    NewSocket,
    SetReadTimeout,
    RecvFrom,
}

impl Display for IoOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NewSocket => write!(f, "create new socket"),
            Self::SetReadTimeout => write!(f, "set read timeout"),
            Self::RecvFrom => write!(f, "recv from"),
        }
    }
}
