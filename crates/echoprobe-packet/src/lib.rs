//! Wire format views for `ICMPv4` echo probing.
//!
//! The following packets are supported:
//! - `IPv4` (header inspection only, used to strip the header from raw socket reads)
//! - `ICMPv4` (generic header, `EchoRequest` and `EchoReply`)
//!
//! # Endianness
//!
//! The internal representation is held in network byte order (big-endian) and
//! all accessor methods take and return data in host byte order, converting as
//! necessary for the given architecture.
//!
//! # Example
//!
//! The following example builds an `ICMPv4` echo request packet:
//!
//! ```rust
//! # fn main() -> anyhow::Result<()> {
//! use echoprobe_packet::checksum::icmp_ipv4_checksum;
//! use echoprobe_packet::icmpv4::echo_request::EchoRequestPacket;
//! use echoprobe_packet::icmpv4::{IcmpCode, IcmpType};
//!
//! let mut buf = [0; EchoRequestPacket::minimum_packet_size()];
//! let mut icmp = EchoRequestPacket::new(&mut buf)?;
//! icmp.set_icmp_type(IcmpType::EchoRequest);
//! icmp.set_icmp_code(IcmpCode(0));
//! icmp.set_identifier(0xABAB);
//! icmp.set_sequence(1);
//! icmp.set_checksum(icmp_ipv4_checksum(icmp.packet()));
//! assert_eq!(icmp.packet(), &hex_literal::hex!("08 00 4c 53 ab ab 00 01"));
//! # Ok(())
//! # }
//! ```
//!
//! The following example reads the `ICMPv4` payload out of a raw `IPv4` datagram:
//!
//! ```rust
//! # fn main() -> anyhow::Result<()> {
//! use echoprobe_packet::icmpv4::echo_reply::EchoReplyPacket;
//! use echoprobe_packet::icmpv4::IcmpType;
//! use echoprobe_packet::ipv4::Ipv4Packet;
//!
//! let buf = hex_literal::hex!(
//!     "45 00 00 1c 00 00 00 00 40 01 00 00 08 08 04 04 c0 a8 01 02"
//!     "00 00 54 53 ab ab 00 01"
//! );
//! let ipv4 = Ipv4Packet::new_view(&buf)?;
//! let echo = EchoReplyPacket::new_view(ipv4.payload())?;
//! assert_eq!(IcmpType::EchoReply, echo.get_icmp_type());
//! assert_eq!(0xABAB, echo.get_identifier());
//! assert_eq!(1, echo.get_sequence());
//! # Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]

mod buffer;

/// Packet errors.
pub mod error;

/// Functions for calculating network checksums.
pub mod checksum;

/// `ICMPv4` packets.
pub mod icmpv4;

/// `IPv4` packets.
pub mod ipv4;

/// The IP packet next layer protocol.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum IpProtocol {
    Icmp,
    Other(u8),
}

impl IpProtocol {
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::Icmp => 1,
            Self::Other(id) => id,
        }
    }
}

impl From<u8> for IpProtocol {
    fn from(id: u8) -> Self {
        match id {
            1 => Self::Icmp,
            p => Self::Other(p),
        }
    }
}

/// Format a payload as a hexadecimal string.
#[must_use]
pub fn fmt_payload(bytes: &[u8]) -> String {
    use itertools::Itertools as _;
    format!("{:02x}", bytes.iter().format(" "))
}
