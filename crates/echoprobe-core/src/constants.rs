/// The maximum number of probes allowed in a single session.
///
/// This bounds the per-probe timing storage, which is allocated up front at this capacity.
pub const MAX_PROBE_COUNT: usize = 10;

/// The `ICMP` identifier carried by every echo request sent by this crate.
///
/// Replies carrying any other identifier belong to some other process and are ignored.
pub const ECHO_IDENTIFIER: u16 = 0xABAB;

/// The size of the echo request payload.
pub const ECHO_PAYLOAD_SIZE: usize = 32;

/// The maximum size of the IP packet we accept from the socket.
pub const MAX_PACKET_SIZE: usize = 1024;
