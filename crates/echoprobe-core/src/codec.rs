use crate::constants::{ECHO_IDENTIFIER, ECHO_PAYLOAD_SIZE};
use crate::error::Result;
use crate::types::Sequence;
use echoprobe_packet::checksum::icmp_ipv4_checksum;
use echoprobe_packet::icmpv4::echo_reply::EchoReplyPacket;
use echoprobe_packet::icmpv4::echo_request::EchoRequestPacket;
use echoprobe_packet::icmpv4::{IcmpCode, IcmpType};
use echoprobe_packet::ipv4::Ipv4Packet;
use std::fmt::{Display, Formatter};

/// The size of an echo request on the wire, header and payload.
pub const ECHO_REQUEST_SIZE: usize = EchoRequestPacket::minimum_packet_size() + ECHO_PAYLOAD_SIZE;

/// Build an `ICMPv4` echo request for a given sequence number.
///
/// The payload is the counting pattern `0, 1, 2, ..` and the checksum is computed last, over the
/// header and payload.
pub fn build_echo_request(sequence: Sequence) -> Result<[u8; ECHO_REQUEST_SIZE]> {
    let mut buf = [0_u8; ECHO_REQUEST_SIZE];
    let mut echo = EchoRequestPacket::new(&mut buf)?;
    echo.set_icmp_type(IcmpType::EchoRequest);
    echo.set_icmp_code(IcmpCode(0));
    echo.set_identifier(ECHO_IDENTIFIER);
    echo.set_sequence(sequence.0);
    echo.set_payload(&payload());
    echo.set_checksum(icmp_ipv4_checksum(echo.packet()));
    Ok(buf)
}

/// Validate a raw `IPv4` datagram as the echo reply for `expected`.
///
/// The `IPv4` header is stripped using its declared header length before the `ICMP` message is
/// checked. Malformed, foreign and stale replies are all reported as `false`.
#[must_use]
pub fn validate_echo_reply(ip_packet: &[u8], expected: Sequence) -> bool {
    match check_ip_packet(ip_packet, expected) {
        Ok(()) => true,
        Err(rejection) => {
            tracing::warn!(%rejection, ?expected, "invalid response");
            false
        }
    }
}

/// Validate an `ICMPv4` message (with no `IPv4` header) as the echo reply for `expected`.
#[must_use]
pub fn is_echo_reply(icmp: &[u8], expected: Sequence) -> bool {
    check_echo_reply(icmp, expected).is_ok()
}

/// The reason a received packet was not accepted as the expected echo reply.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Rejection {
    Truncated(usize),
    BadHeaderLength(usize),
    NotEchoReply(u8),
    BadCode(u8),
    ForeignIdentifier(u16),
    WrongSequence(u16),
}

impl Display for Rejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Truncated(len) => write!(f, "packet too short ({len} bytes)"),
            Self::BadHeaderLength(len) => write!(f, "implausible IP header length ({len} bytes)"),
            Self::NotEchoReply(icmp_type) => write!(f, "not an echo reply (type {icmp_type})"),
            Self::BadCode(code) => write!(f, "unexpected code {code}"),
            Self::ForeignIdentifier(id) => write!(f, "foreign identifier {id:#06x}"),
            Self::WrongSequence(seq) => write!(f, "unexpected sequence {seq}"),
        }
    }
}

fn check_ip_packet(ip_packet: &[u8], expected: Sequence) -> std::result::Result<(), Rejection> {
    let ipv4 =
        Ipv4Packet::new_view(ip_packet).map_err(|_| Rejection::Truncated(ip_packet.len()))?;
    let header_len = ipv4.header_length_bytes();
    if header_len < Ipv4Packet::minimum_packet_size() || header_len > ip_packet.len() {
        return Err(Rejection::BadHeaderLength(header_len));
    }
    check_echo_reply(ipv4.payload(), expected)
}

fn check_echo_reply(icmp: &[u8], expected: Sequence) -> std::result::Result<(), Rejection> {
    let echo = EchoReplyPacket::new_view(icmp).map_err(|_| Rejection::Truncated(icmp.len()))?;
    if echo.get_icmp_type() != IcmpType::EchoReply {
        return Err(Rejection::NotEchoReply(echo.get_icmp_type().id()));
    }
    if echo.get_icmp_code() != IcmpCode(0) {
        return Err(Rejection::BadCode(echo.get_icmp_code().0));
    }
    if echo.get_identifier() != ECHO_IDENTIFIER {
        return Err(Rejection::ForeignIdentifier(echo.get_identifier()));
    }
    if echo.get_sequence() != expected.0 {
        return Err(Rejection::WrongSequence(echo.get_sequence()));
    }
    Ok(())
}

fn payload() -> [u8; ECHO_PAYLOAD_SIZE] {
    core::array::from_fn(|i| i as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use echoprobe_packet::checksum::internet_checksum;
    use hex_literal::hex;
    use test_case::test_case;

    const IPV4_HEADER: [u8; 20] = hex!("45 00 00 3c 00 00 00 00 3a 01 b1 e6 08 08 04 04 c0 a8 01 02");

    fn echo_reply(icmp_type: u8, code: u8, identifier: u16, sequence: u16) -> Vec<u8> {
        let mut icmp = build_echo_request(Sequence(sequence)).unwrap();
        icmp[0] = icmp_type;
        icmp[1] = code;
        icmp[4..6].copy_from_slice(&identifier.to_be_bytes());
        icmp[6..8].copy_from_slice(&sequence.to_be_bytes());
        let checksum = icmp_ipv4_checksum(&icmp);
        icmp[2..4].copy_from_slice(&checksum.to_be_bytes());
        IPV4_HEADER.iter().chain(icmp.iter()).copied().collect()
    }

    #[test]
    fn test_build_echo_request() {
        let expected = hex!(
            "
            08 00 5b 52 ab ab 00 01
            00 01 02 03 04 05 06 07 08 09 0a 0b 0c 0d 0e 0f
            10 11 12 13 14 15 16 17 18 19 1a 1b 1c 1d 1e 1f
            "
        );
        assert_eq!(expected, build_echo_request(Sequence(1)).unwrap());
    }

    #[test]
    fn test_build_echo_request_is_deterministic() {
        assert_eq!(
            build_echo_request(Sequence(7)).unwrap(),
            build_echo_request(Sequence(7)).unwrap()
        );
        assert_ne!(
            build_echo_request(Sequence(7)).unwrap(),
            build_echo_request(Sequence(8)).unwrap()
        );
    }

    #[test_case(1)]
    #[test_case(4)]
    #[test_case(10)]
    #[test_case(u16::MAX)]
    fn test_echo_request_checksum_verifies(sequence: u16) {
        let packet = build_echo_request(Sequence(sequence)).unwrap();
        assert_eq!(ECHO_REQUEST_SIZE, packet.len());
        assert_eq!(0, internet_checksum(&packet));
    }

    #[test]
    fn test_accept_matching_reply() {
        let packet = echo_reply(0, 0, ECHO_IDENTIFIER, 3);
        assert!(validate_echo_reply(&packet, Sequence(3)));
        assert!(is_echo_reply(&packet[20..], Sequence(3)));
    }

    #[test_case(8, 0, ECHO_IDENTIFIER, 3; "echo request type")]
    #[test_case(3, 0, ECHO_IDENTIFIER, 3; "destination unreachable type")]
    #[test_case(0, 1, ECHO_IDENTIFIER, 3; "non zero code")]
    #[test_case(0, 0, 0xABAC, 3; "foreign identifier")]
    #[test_case(0, 0, ECHO_IDENTIFIER, 2; "previous sequence")]
    #[test_case(0, 0, ECHO_IDENTIFIER, 4; "next sequence")]
    fn test_reject_mutated_reply(icmp_type: u8, code: u8, identifier: u16, sequence: u16) {
        let packet = echo_reply(icmp_type, code, identifier, sequence);
        assert!(!validate_echo_reply(&packet, Sequence(3)));
        assert!(!is_echo_reply(&packet[20..], Sequence(3)));
    }

    #[test]
    fn test_strip_header_with_options() {
        let reply = echo_reply(0, 0, ECHO_IDENTIFIER, 1);
        let mut packet = vec![0x46];
        packet.extend_from_slice(&reply[1..20]);
        packet.extend_from_slice(&[0x01, 0x01, 0x01, 0x00]);
        packet.extend_from_slice(&reply[20..]);
        assert!(validate_echo_reply(&packet, Sequence(1)));
    }

    #[test]
    fn test_reject_header_only_reply() {
        let packet = hex!(
            "45 00 00 1c 00 00 00 00 3a 01 b1 e6 08 08 04 04 c0 a8 01 02 00 00 54 53 ab ab 00"
        );
        assert!(!validate_echo_reply(&packet, Sequence(1)));
    }

    #[test]
    fn test_minimal_reply() {
        let packet = hex!(
            "45 00 00 1c 00 00 00 00 3a 01 b1 e6 08 08 04 04 c0 a8 01 02 00 00 54 53 ab ab 00 01"
        );
        assert!(validate_echo_reply(&packet, Sequence(1)));
    }

    #[test_case(&[]; "empty")]
    #[test_case(&hex!("45 00 00 1c"); "truncated ip header")]
    #[test_case(&hex!("44 00 00 1c 00 00 00 00 3a 01 b1 e6 08 08 04 04 c0 a8 01 02 00 00 54 53 ab ab 00 01"); "ihl too small")]
    #[test_case(&hex!("4f 00 00 1c 00 00 00 00 3a 01 b1 e6 08 08 04 04 c0 a8 01 02 00 00 54 53 ab ab 00 01"); "ihl beyond buffer")]
    fn test_reject_malformed(packet: &[u8]) {
        assert!(!validate_echo_reply(packet, Sequence(1)));
    }

    #[test]
    fn test_rejection_display() {
        assert_eq!(
            "foreign identifier 0xabac",
            Rejection::ForeignIdentifier(0xABAC).to_string()
        );
        assert_eq!(
            Err(Rejection::WrongSequence(2)),
            check_echo_reply(&hex!("00 00 54 52 ab ab 00 02"), Sequence(1))
        );
    }
}
