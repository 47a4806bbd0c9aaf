//! # Packet Handler
//!
//! ## Purpose
//!
//! Per-frame entry point: parses the link-layer header, dispatches on
//! ether-type, and runs the forwarding state machine — local replies for
//! address-resolution queries and echo requests, unreachable/time-exceeded
//! synthesis for the failure cases, and transit forwarding through the
//! routing table and resolution cache otherwise.
//!
//! `bytes` is borrowed only for the duration of the call; anything this
//! module retains past it (a queued frame, a reply under construction) is
//! an owned copy.

use crate::cache::PendingFrame;
use crate::notify;
use crate::router::Router;
use crate::transport::Transmit;
use crate::wire::{arp, ethernet, icmp, ipv4};
use std::time::Instant;

pub fn handle<T: Transmit>(router: &Router<T>, iface: &str, bytes: &[u8]) {
    let Some(frame) = ethernet::Frame::new_checked(bytes) else {
        return;
    };
    match frame.ethertype() {
        ethernet::EtherType::Ipv4 => handle_ipv4(router, iface, bytes),
        ethernet::EtherType::Arp => handle_arp(router, iface, bytes),
        ethernet::EtherType::Unknown(_) => {}
    }
}

fn transmit<T: Transmit>(router: &Router<T>, iface: &str, bytes: &[u8]) {
    if let Err(err) = router.transport.transmit(iface, bytes) {
        log::warn!("transmit on {iface} failed: {err}");
    }
}

fn handle_ipv4<T: Transmit>(router: &Router<T>, iface: &str, bytes: &[u8]) {
    let frame = ethernet::Frame::new_checked(bytes).expect("ethertype dispatch already validated length");
    let ip_payload = frame.payload();

    let Some(header) = ipv4::Header::new_checked(ip_payload) else {
        return;
    };
    if !header.verify_checksum() {
        return;
    }

    let Some(receiving) = router.interfaces.get(iface) else {
        return;
    };

    let src = header.src();
    let dst = header.dst();
    let total_len = header.total_len() as usize;
    let body_offset = header.ihl() as usize * 4;
    let protocol = header.protocol();

    if router.interfaces.find_by_net_addr(dst).is_some() {
        handle_local_ipv4(router, iface, &frame, &ip_payload[..total_len], protocol, body_offset, src, dst);
        return;
    }

    handle_transit_ipv4(router, iface, receiving.link_addr, receiving.net_addr, &frame, ip_payload, total_len, header.ttl(), src, dst);
}

#[allow(clippy::too_many_arguments)]
fn handle_local_ipv4<T: Transmit>(
    router: &Router<T>,
    iface: &str,
    frame: &ethernet::Frame<'_>,
    datagram: &[u8],
    protocol: ipv4::Protocol,
    body_offset: usize,
    src: std::net::Ipv4Addr,
    dst: std::net::Ipv4Addr,
) {
    if protocol != ipv4::Protocol::Icmp {
        let quote = notify::quote_of(datagram);
        let reply = notify::build_error(
            frame.src(),
            frame.dst(),
            dst,
            src,
            icmp::TYPE_DEST_UNREACHABLE,
            icmp::CODE_PORT_UNREACHABLE,
            &quote,
        );
        transmit(router, iface, &reply);
        return;
    }

    let Some(echo) = icmp::EchoHeader::new_checked(&datagram[body_offset..]) else {
        return;
    };
    if echo.icmp_type() != icmp::TYPE_ECHO_REQUEST || echo.code() != 0 {
        return;
    }

    let mut owned = vec![0u8; ethernet::HEADER_LEN + datagram.len()];
    ethernet::build(&mut owned[..ethernet::HEADER_LEN], frame.src(), frame.dst(), ethernet::EtherType::Ipv4);
    owned[ethernet::HEADER_LEN..].copy_from_slice(datagram);

    {
        let mut ip_view = ipv4::HeaderMut::new_checked(&mut owned[ethernet::HEADER_LEN..]).unwrap();
        ip_view.set_src(dst);
        ip_view.set_dst(src);
        ip_view.recompute_checksum();
    }
    let control_start = ethernet::HEADER_LEN + body_offset;
    {
        let mut echo_view = icmp::EchoHeaderMut::new_checked(&mut owned[control_start..]).unwrap();
        echo_view.set_type_code(icmp::TYPE_ECHO_REPLY, 0);
        echo_view.recompute_checksum();
    }
    transmit(router, iface, &owned);
}

#[allow(clippy::too_many_arguments)]
fn handle_transit_ipv4<T: Transmit>(
    router: &Router<T>,
    iface: &str,
    receiving_link_addr: [u8; 6],
    receiving_net_addr: std::net::Ipv4Addr,
    frame: &ethernet::Frame<'_>,
    ip_payload: &[u8],
    total_len: usize,
    ttl: u8,
    src: std::net::Ipv4Addr,
    dst: std::net::Ipv4Addr,
) {
    // link addresses are placeholders: the resolved next-hop and outgoing
    // interface overwrite them before this frame is ever transmitted, on
    // both the cache-hit and flush-after-resolution paths.
    let mut owned = vec![0u8; ethernet::HEADER_LEN + total_len];
    ethernet::build(&mut owned[..ethernet::HEADER_LEN], frame.dst(), frame.src(), ethernet::EtherType::Ipv4);
    owned[ethernet::HEADER_LEN..].copy_from_slice(&ip_payload[..total_len]);

    let new_ttl = ttl.saturating_sub(1);
    {
        let mut ip_view = ipv4::HeaderMut::new_checked(&mut owned[ethernet::HEADER_LEN..]).unwrap();
        ip_view.set_ttl(new_ttl);
        ip_view.recompute_checksum();
    }

    if new_ttl == 0 {
        let quote = notify::quote_of(&owned[ethernet::HEADER_LEN..]);
        let reply = notify::build_error(
            frame.src(),
            receiving_link_addr,
            receiving_net_addr,
            src,
            icmp::TYPE_TIME_EXCEEDED,
            icmp::CODE_TTL_EXCEEDED_IN_TRANSIT,
            &quote,
        );
        transmit(router, iface, &reply);
        return;
    }

    let Some(route) = router.routes.resolve_route(dst) else {
        let quote = notify::quote_of(&owned[ethernet::HEADER_LEN..]);
        let reply = notify::build_error(
            frame.src(),
            receiving_link_addr,
            receiving_net_addr,
            src,
            icmp::TYPE_DEST_UNREACHABLE,
            icmp::CODE_NETWORK_UNREACHABLE,
            &quote,
        );
        transmit(router, iface, &reply);
        return;
    };

    let resolution_key = route.resolution_key(dst);
    let outgoing_iface = route.iface.clone();
    let now = Instant::now();

    match router.cache.lookup(resolution_key, now) {
        Some(link_addr) => {
            let Some(outgoing) = router.interfaces.get(&outgoing_iface) else {
                return;
            };
            ethernet::set_addrs(&mut owned, link_addr, outgoing.link_addr);
            transmit(router, &outgoing_iface, &owned);
        }
        None => {
            router
                .cache
                .queue_for_resolution(resolution_key, PendingFrame { bytes: owned, iface: iface.into() });
        }
    }
}

fn handle_arp<T: Transmit>(router: &Router<T>, iface: &str, bytes: &[u8]) {
    let frame = ethernet::Frame::new_checked(bytes).expect("ethertype dispatch already validated length");
    let Some(message) = arp::Message::new_checked(frame.payload()) else {
        return;
    };
    let Some(receiving) = router.interfaces.get(iface) else {
        return;
    };

    match message.operation() {
        arp::Operation::Request if message.target_proto() == receiving.net_addr => {
            let mut reply = vec![0u8; ethernet::HEADER_LEN + arp::MESSAGE_LEN];
            ethernet::build(&mut reply, frame.src(), receiving.link_addr, ethernet::EtherType::Arp);
            arp::build(
                &mut reply[ethernet::HEADER_LEN..],
                arp::Operation::Reply,
                receiving.link_addr,
                receiving.net_addr,
                message.sender_hw(),
                message.sender_proto(),
            );
            transmit(router, iface, &reply);
        }
        arp::Operation::Reply => {
            let now = Instant::now();
            if let Some(req) = router.cache.insert(message.sender_proto(), message.sender_hw(), now) {
                for pending in req.frames {
                    let mut owned = pending.bytes;
                    ethernet::set_addrs(&mut owned, message.sender_hw(), receiving.link_addr);
                    transmit(router, iface, &owned);
                }
            }
        }
        _ => {}
    }
}
