//! # Resolution Cache
//!
//! ## Purpose
//!
//! The single piece of shared mutable state in this crate: a bounded table
//! of `(network address → link address)` bindings plus a queue of pending
//! resolution requests, each owning the frames waiting on it.
//!
//! ## Locking
//!
//! The reference design guards both structures with one re-entrant lock so
//! the sweeper, already holding it, can call the same operations the packet
//! handler calls. A plain [`std::sync::Mutex`] is not re-entrant, so instead
//! every operation — public or sweep-internal — is built on private
//! `*_locked` helpers that take `&mut CacheState` directly; the sweeper
//! calls them against the guard it is already holding rather than looping
//! back through the public API. No nested lock acquisition ever happens.
//!
//! ## Sweep iteration
//!
//! The reference design walks a singly-linked list of requests, saving
//! `next` before each step because handling a request may detach it
//! mid-traversal. Here requests live in a `Vec` and the sweep walks by
//! index, only advancing past an entry that survives the step — removing
//! an entry shifts everything after it down by one, which the index simply
//! doesn't advance past, so nothing is skipped and nothing is visited
//! twice.

use crate::config::CacheConfig;
use rand::Rng;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::net::Ipv4Addr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
pub struct Binding {
    pub net_addr: Ipv4Addr,
    pub link_addr: [u8; 6],
    pub added_at: Instant,
    pub valid: bool,
}

#[derive(Clone, Debug)]
pub struct PendingFrame {
    pub bytes: Vec<u8>,
    pub iface: Box<str>,
}

#[derive(Clone, Debug)]
pub struct PendingRequest {
    pub net_addr: Ipv4Addr,
    pub frames: Vec<PendingFrame>,
    pub last_sent_at: Option<Instant>,
    pub attempts: u32,
}

/// What the sweeper found: interfaces to issue retry broadcasts on, plus
/// requests that exhausted their retries and must be failed.
pub struct SweepReport {
    pub retries: Vec<Ipv4Addr>,
    pub giveups: Vec<PendingRequest>,
}

struct CacheState {
    bindings: Vec<Option<Binding>>,
    requests: Vec<PendingRequest>,
    rng: StdRng,
}

impl CacheState {
    fn lookup(&self, net_addr: Ipv4Addr, now: Instant, ttl: Duration) -> Option<[u8; 6]> {
        self.bindings
            .iter()
            .flatten()
            .find(|b| b.net_addr == net_addr && b.valid && now.duration_since(b.added_at) <= ttl)
            .map(|b| b.link_addr)
    }

    fn queue_for_resolution(&mut self, net_addr: Ipv4Addr, frame: PendingFrame) {
        if let Some(req) = self.requests.iter_mut().find(|r| r.net_addr == net_addr) {
            req.frames.push(frame);
            return;
        }
        self.requests.push(PendingRequest {
            net_addr,
            frames: vec![frame],
            last_sent_at: None,
            attempts: 0,
        });
    }

    fn insert(&mut self, net_addr: Ipv4Addr, link_addr: [u8; 6], now: Instant) -> Option<PendingRequest> {
        let removed = self
            .requests
            .iter()
            .position(|r| r.net_addr == net_addr)
            .map(|i| self.requests.remove(i));

        let slot_index = self
            .bindings
            .iter()
            .position(|slot| matches!(slot, Some(b) if b.net_addr == net_addr))
            .or_else(|| self.bindings.iter().position(|slot| slot.is_none()))
            .or_else(|| self.bindings.iter().position(|slot| matches!(slot, Some(b) if !b.valid)))
            .unwrap_or_else(|| self.rng.gen_range(0..self.bindings.len()));

        self.bindings[slot_index] = Some(Binding {
            net_addr,
            link_addr,
            added_at: now,
            valid: true,
        });

        removed
    }

    fn destroy_request(&mut self, net_addr: Ipv4Addr) -> Option<PendingRequest> {
        self.requests
            .iter()
            .position(|r| r.net_addr == net_addr)
            .map(|i| self.requests.remove(i))
    }

    fn sweep(&mut self, config: &CacheConfig, now: Instant) -> SweepReport {
        for slot in self.bindings.iter_mut().flatten() {
            if slot.valid && now.duration_since(slot.added_at) > config.binding_ttl {
                slot.valid = false;
            }
        }

        let mut retries = Vec::new();
        let mut giveups = Vec::new();
        let mut i = 0;
        while i < self.requests.len() {
            let recently_sent = self.requests[i]
                .last_sent_at
                .is_some_and(|sent| now.duration_since(sent) <= config.retry_interval);
            if recently_sent {
                i += 1;
                continue;
            }
            if self.requests[i].attempts >= config.max_retries {
                giveups.push(self.requests.remove(i));
                continue;
            }
            retries.push(self.requests[i].net_addr);
            self.requests[i].last_sent_at = Some(now);
            self.requests[i].attempts += 1;
            i += 1;
        }

        SweepReport { retries, giveups }
    }
}

/// Thread-safe binding table and pending-resolution queue.
pub struct ResolutionCache {
    config: CacheConfig,
    state: Mutex<CacheState>,
}

impl ResolutionCache {
    pub fn new(config: CacheConfig) -> Self {
        ResolutionCache {
            state: Mutex::new(CacheState {
                bindings: vec![None; config.capacity],
                requests: Vec::new(),
                rng: StdRng::from_entropy(),
            }),
            config,
        }
    }

    /// Returns a copy of the cached link address for `net_addr`, if a valid
    /// binding exists. Never a borrow: the slot may be reused the instant
    /// the lock is released.
    pub fn lookup(&self, net_addr: Ipv4Addr, now: Instant) -> Option<[u8; 6]> {
        self.state.lock().unwrap().lookup(net_addr, now, self.config.binding_ttl)
    }

    /// Queues `frame` on the pending request for `net_addr`, creating the
    /// request if none exists yet. At most one request per address exists
    /// at a time, so `net_addr` itself doubles as a stable handle.
    pub fn queue_for_resolution(&self, net_addr: Ipv4Addr, frame: PendingFrame) {
        self.state.lock().unwrap().queue_for_resolution(net_addr, frame);
    }

    /// Records a resolved binding and hands back the pending request it
    /// satisfies, if any, so its queued frames can be flushed.
    pub fn insert(&self, net_addr: Ipv4Addr, link_addr: [u8; 6], now: Instant) -> Option<PendingRequest> {
        self.state.lock().unwrap().insert(net_addr, link_addr, now)
    }

    /// Removes and returns the pending request for `net_addr`, if any.
    /// A no-op, returning `None`, when no such request is queued.
    pub fn destroy_request(&self, net_addr: Ipv4Addr) -> Option<PendingRequest> {
        self.state.lock().unwrap().destroy_request(net_addr)
    }

    /// Invalidates expired bindings and decides, per pending request,
    /// whether to retry or give up. Takes the lock once; callers transmit
    /// the resulting queries and give-up notifications after it is
    /// released.
    pub fn sweep(&self, now: Instant) -> SweepReport {
        self.state.lock().unwrap().sweep(&self.config, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(iface: &str) -> PendingFrame {
        PendingFrame { bytes: vec![0u8; 10], iface: iface.into() }
    }

    #[test]
    fn lookup_misses_on_empty_cache() {
        let cache = ResolutionCache::new(CacheConfig::default());
        assert!(cache.lookup(Ipv4Addr::new(10, 0, 0, 1), Instant::now()).is_none());
    }

    #[test]
    fn insert_then_lookup_returns_link_addr() {
        let cache = ResolutionCache::new(CacheConfig::default());
        let now = Instant::now();
        cache.insert(Ipv4Addr::new(10, 0, 0, 2), [0, 1, 2, 3, 4, 5], now);
        assert_eq!(cache.lookup(Ipv4Addr::new(10, 0, 0, 2), now), Some([0, 1, 2, 3, 4, 5]));
    }

    #[test]
    fn two_inserts_for_same_address_leave_one_binding_with_latest_timestamp() {
        let cache = ResolutionCache::new(CacheConfig::default());
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(1);
        let addr = Ipv4Addr::new(10, 0, 0, 2);
        cache.insert(addr, [1; 6], t0);
        cache.insert(addr, [2; 6], t1);
        let bindings_valid_count = {
            let state = cache.state.lock().unwrap();
            state.bindings.iter().flatten().filter(|b| b.net_addr == addr && b.valid).count()
        };
        assert_eq!(bindings_valid_count, 1);
        assert_eq!(cache.lookup(addr, t1), Some([2; 6]));
    }

    #[test]
    fn reinserting_the_same_address_reuses_its_existing_slot() {
        let cache = ResolutionCache::new(CacheConfig::default());
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(1);
        let addr = Ipv4Addr::new(10, 0, 0, 2);
        cache.insert(addr, [1; 6], t0);
        cache.insert(addr, [2; 6], t1);
        let occupied_slots = {
            let state = cache.state.lock().unwrap();
            state.bindings.iter().flatten().count()
        };
        assert_eq!(occupied_slots, 1);
    }

    #[test]
    fn binding_expires_after_ttl() {
        let cache = ResolutionCache::new(CacheConfig::default());
        let t0 = Instant::now();
        let addr = Ipv4Addr::new(10, 0, 0, 2);
        cache.insert(addr, [1; 6], t0);
        assert!(cache.lookup(addr, t0 + Duration::from_secs(14)).is_some());
        assert!(cache.lookup(addr, t0 + Duration::from_secs(16)).is_none());
    }

    #[test]
    fn queue_for_resolution_reuses_existing_request() {
        let cache = ResolutionCache::new(CacheConfig::default());
        let addr = Ipv4Addr::new(10, 1, 0, 1);
        cache.queue_for_resolution(addr, frame("eth0"));
        cache.queue_for_resolution(addr, frame("eth0"));
        let req = cache.destroy_request(addr).unwrap();
        assert_eq!(req.frames.len(), 2);
    }

    #[test]
    fn insert_returns_and_detaches_the_matching_pending_request() {
        let cache = ResolutionCache::new(CacheConfig::default());
        let addr = Ipv4Addr::new(10, 1, 0, 1);
        cache.queue_for_resolution(addr, frame("eth0"));
        cache.queue_for_resolution(addr, frame("eth0"));
        cache.queue_for_resolution(addr, frame("eth0"));
        let req = cache.insert(addr, [9; 6], Instant::now()).unwrap();
        assert_eq!(req.net_addr, addr);
        assert_eq!(req.frames.len(), 3);
        assert!(cache.destroy_request(addr).is_none());
    }

    #[test]
    fn insert_on_empty_queue_is_a_no_op() {
        let cache = ResolutionCache::new(CacheConfig::default());
        assert!(cache.insert(Ipv4Addr::new(1, 2, 3, 4), [0; 6], Instant::now()).is_none());
    }

    #[test]
    fn sweep_retries_fresh_request_immediately() {
        let cache = ResolutionCache::new(CacheConfig::default());
        let addr = Ipv4Addr::new(10, 1, 0, 1);
        cache.queue_for_resolution(addr, frame("eth0"));
        let report = cache.sweep(Instant::now());
        assert_eq!(report.retries, vec![addr]);
        assert!(report.giveups.is_empty());
    }

    #[test]
    fn sweep_skips_a_request_retried_within_the_last_second() {
        let cache = ResolutionCache::new(CacheConfig::default());
        let addr = Ipv4Addr::new(10, 1, 0, 1);
        cache.queue_for_resolution(addr, frame("eth0"));
        let t0 = Instant::now();
        let first = cache.sweep(t0);
        assert_eq!(first.retries, vec![addr]);
        let second = cache.sweep(t0 + Duration::from_millis(500));
        assert!(second.retries.is_empty());
        assert!(second.giveups.is_empty());
    }

    #[test]
    fn sweep_gives_up_after_five_retries() {
        let cache = ResolutionCache::new(CacheConfig::default());
        let addr = Ipv4Addr::new(10, 1, 0, 1);
        cache.queue_for_resolution(addr, frame("eth0"));
        let t0 = Instant::now();
        let step = Duration::from_millis(1100);
        for n in 0..5u32 {
            let report = cache.sweep(t0 + step * n);
            assert_eq!(report.retries, vec![addr]);
            assert!(report.giveups.is_empty());
        }
        let final_report = cache.sweep(t0 + step * 5);
        assert!(final_report.retries.is_empty());
        assert_eq!(final_report.giveups.len(), 1);
        assert_eq!(final_report.giveups[0].net_addr, addr);
    }

    #[test]
    fn sweep_handles_give_up_and_retry_in_the_same_pass_without_skipping() {
        let cache = ResolutionCache::new(CacheConfig::default());
        let giveup_addr = Ipv4Addr::new(10, 1, 0, 1);
        let retry_addr = Ipv4Addr::new(10, 1, 0, 2);
        let t0 = Instant::now();
        let step = Duration::from_millis(1100);
        cache.queue_for_resolution(giveup_addr, frame("eth0"));
        for n in 0..5u32 {
            cache.sweep(t0 + step * n);
        }
        // now queue a second, fresh request just before the give-up sweep
        cache.queue_for_resolution(retry_addr, frame("eth0"));
        let report = cache.sweep(t0 + step * 5);
        assert_eq!(report.retries, vec![retry_addr]);
        assert_eq!(report.giveups.len(), 1);
        assert_eq!(report.giveups[0].net_addr, giveup_addr);
    }
}
