//! # Unreachable / Time-Exceeded Notification Synthesis
//!
//! Both the packet handler (TTL exhausted, no route, local non-ICMP
//! delivery) and the cache sweep (resolution give-up) need to build the
//! same shape of frame: an ICMP error addressed back to the sender of
//! some earlier datagram, quoting that datagram's header and first 8
//! bytes of payload. Sharing the builder keeps that shape, and the
//! §9-mandated fixed `ip_len` of 56 bytes, in one place.

use crate::wire::{ethernet, icmp, ipv4};
use std::net::Ipv4Addr;

/// TTL applied to self-originated notifications. The reference design has
/// no notion of one — 64 matches common router defaults and every other
/// self-originated datagram this crate builds (echo replies aside, which
/// copy the request's TTL handling is not specified for; see `handler.rs`).
pub const NOTIFICATION_TTL: u8 = 64;

/// Fixed per §9: `20 (IP) + 8 (ICMP error header) + 20 (quoted IP) + 8
/// (quoted payload) = 56`, regardless of the original datagram's actual
/// length.
pub const NOTIFICATION_IP_LEN: u16 = 56;

/// Copies up to [`icmp::QUOTE_LEN`] bytes starting at the original IPv4
/// header into a fixed-size quote, zero-padding if the original datagram
/// (header plus body) was shorter than that.
pub fn quote_of(ip_header_and_body: &[u8]) -> [u8; icmp::QUOTE_LEN] {
    let mut quote = [0u8; icmp::QUOTE_LEN];
    let n = ip_header_and_body.len().min(icmp::QUOTE_LEN);
    quote[..n].copy_from_slice(&ip_header_and_body[..n]);
    quote
}

/// Builds a complete Ethernet+IPv4+ICMP error frame.
#[allow(clippy::too_many_arguments)]
pub fn build_error(
    link_dst: [u8; 6],
    link_src: [u8; 6],
    net_src: Ipv4Addr,
    net_dst: Ipv4Addr,
    icmp_type: u8,
    icmp_code: u8,
    quote: &[u8; icmp::QUOTE_LEN],
) -> Vec<u8> {
    let mut buf = vec![0u8; ethernet::HEADER_LEN + ipv4::HEADER_LEN + icmp::ERROR_MESSAGE_LEN];

    ethernet::build(&mut buf[..ethernet::HEADER_LEN], link_dst, link_src, ethernet::EtherType::Ipv4);

    let ip_start = ethernet::HEADER_LEN;
    let ip_end = ip_start + ipv4::HEADER_LEN;
    ipv4::build(
        &mut buf[ip_start..ip_end],
        NOTIFICATION_IP_LEN,
        NOTIFICATION_TTL,
        ipv4::Protocol::Icmp,
        net_src,
        net_dst,
    );

    icmp::build_error(&mut buf[ip_end..], icmp_type, icmp_code, quote);

    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::checksum;

    #[test]
    fn builds_a_valid_notification_frame() {
        let original = [0xAAu8; 40];
        let quote = quote_of(&original);
        let frame = build_error(
            [1; 6],
            [2; 6],
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(10, 0, 0, 2),
            icmp::TYPE_DEST_UNREACHABLE,
            icmp::CODE_HOST_UNREACHABLE,
            &quote,
        );
        assert_eq!(frame.len(), ethernet::HEADER_LEN + ipv4::HEADER_LEN + icmp::ERROR_MESSAGE_LEN);

        let ip_start = ethernet::HEADER_LEN;
        let ip_header = ipv4::Header::new_checked(&frame[ip_start..]).unwrap();
        assert!(ip_header.verify_checksum());
        assert_eq!(ip_header.total_len(), NOTIFICATION_IP_LEN);
        assert_eq!(ip_header.ttl(), NOTIFICATION_TTL);

        let icmp_start = ip_start + ipv4::HEADER_LEN;
        assert!(checksum::verify(&frame[icmp_start..]));
        assert_eq!(frame[icmp_start], icmp::TYPE_DEST_UNREACHABLE);
        assert_eq!(frame[icmp_start + 1], icmp::CODE_HOST_UNREACHABLE);
    }

    #[test]
    fn quote_pads_a_short_original_datagram() {
        let quote = quote_of(&[1, 2, 3]);
        assert_eq!(&quote[..3], &[1, 2, 3]);
        assert!(quote[3..].iter().all(|&b| b == 0));
    }
}
