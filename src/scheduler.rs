//! # Resolution Scheduler
//!
//! ## Purpose
//!
//! A dedicated thread that ticks the resolution cache once per second:
//! invalidate expired bindings, retry outstanding resolutions by
//! broadcasting an address-resolution query on every interface, and give
//! up on requests that have exhausted their retries by emitting a
//! host-unreachable notification for every frame still waiting on them.
//!
//! ## How it works
//!
//! [`ResolutionCache::sweep`] takes the cache lock once and returns a
//! snapshot of what to do; the actual `transmit` calls happen afterward,
//! with the lock released, per the relaxed alternative `spec.md` §9 allows
//! over holding the lock across transmission.

use crate::cache::PendingRequest;
use crate::notify;
use crate::router::Router;
use crate::transport::Transmit;
use crate::wire::{arp, ethernet, icmp, ipv4};
use std::net::Ipv4Addr;
use std::thread;
use std::time::{Duration, Instant};

/// Runs the sweep loop on the calling thread, forever. Callers typically
/// spawn this on a dedicated thread alongside whatever drives `receive`
/// calls into `handler::handle`.
pub fn run<T: Transmit>(router: &Router<T>, tick: Duration) -> ! {
    loop {
        thread::sleep(tick);
        tick_once(router);
    }
}

/// Runs a single sweep and acts on its results. Exposed separately from
/// [`run`] so tests can drive the scheduler deterministically instead of
/// sleeping.
pub fn tick_once<T: Transmit>(router: &Router<T>) {
    let report = router.cache.sweep(Instant::now());
    for net_addr in report.retries {
        broadcast_query(router, net_addr);
    }
    for request in report.giveups {
        give_up(router, request);
    }
}

fn broadcast_query<T: Transmit>(router: &Router<T>, net_addr: Ipv4Addr) {
    for record in router.interfaces.iter() {
        let mut query = vec![0u8; ethernet::HEADER_LEN + arp::MESSAGE_LEN];
        ethernet::build(&mut query[..ethernet::HEADER_LEN], ethernet::BROADCAST, record.link_addr, ethernet::EtherType::Arp);
        arp::build(
            &mut query[ethernet::HEADER_LEN..],
            arp::Operation::Request,
            record.link_addr,
            record.net_addr,
            [0; 6],
            net_addr,
        );
        if let Err(err) = router.transport.transmit(&record.name, &query) {
            log::warn!("transmit on {} failed: {err}", record.name);
        }
    }
}

fn give_up<T: Transmit>(router: &Router<T>, request: PendingRequest) {
    for pending in request.frames {
        let Some(receiving) = router.interfaces.get(&pending.iface) else {
            continue;
        };
        let Some(frame) = ethernet::Frame::new_checked(&pending.bytes) else {
            continue;
        };
        let Some(ip_header) = ipv4::Header::new_checked(frame.payload()) else {
            continue;
        };
        let quote = notify::quote_of(frame.payload());
        let reply = notify::build_error(
            frame.src(),
            receiving.link_addr,
            receiving.net_addr,
            ip_header.src(),
            icmp::TYPE_DEST_UNREACHABLE,
            icmp::CODE_HOST_UNREACHABLE,
            &quote,
        );
        if let Err(err) = router.transport.transmit(&pending.iface, &reply) {
            log::warn!("transmit on {} failed: {err}", pending.iface);
        }
    }
}
