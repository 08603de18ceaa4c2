//! Internet checksum (RFC 1071) as used by `IPv4` and `ICMPv4`.
//!
//! This code is derived from [`libpnet`] which is available under the Apache 2.0 license.
//!
//! [`libpnet`]: https://github.com/libpnet/libpnet

/// The index of the 16-bit checksum word in an `ICMPv4` header.
const ICMP_CHECKSUM_WORD: usize = 1;

/// Calculate the checksum for an `Ipv4` `ICMP` packet.
///
/// The existing value of the checksum field is ignored, so this may be called on a packet whose
/// checksum has already been set.
#[must_use]
pub fn icmp_ipv4_checksum(data: &[u8]) -> u16 {
    checksum(data, Some(ICMP_CHECKSUM_WORD))
}

/// Calculate the Internet checksum over every word of `data`.
///
/// A buffer which already carries a correct checksum verifies to zero.
#[must_use]
pub fn internet_checksum(data: &[u8]) -> u16 {
    checksum(data, None)
}

fn checksum(data: &[u8], ignore_word: Option<usize>) -> u16 {
    if data.is_empty() {
        return 0;
    }
    finalize_checksum(sum_be_words(data, ignore_word))
}

fn sum_be_words(data: &[u8], ignore_word: Option<usize>) -> u32 {
    let mut words = data.chunks_exact(2);
    let mut sum = words
        .by_ref()
        .enumerate()
        .filter(|(i, _)| Some(*i) != ignore_word)
        .map(|(_, word)| u32::from(u16::from_be_bytes([word[0], word[1]])))
        .sum::<u32>();
    if let [last] = words.remainder() {
        if Some(data.len() / 2) != ignore_word {
            sum += u32::from(*last) << 8;
        }
    }
    sum
}

const fn finalize_checksum(mut sum: u32) -> u16 {
    while sum >> 16 != 0 {
        sum = (sum >> 16) + (sum & 0xFFFF);
    }
    !sum as u16
}
