//! # Routing Table
//!
//! ## Purpose
//!
//! An immutable list of `(destination, mask, gateway, interface)` entries,
//! queried by longest-prefix-match to find the next hop for a destination
//! address.
//!
//! ## How it works
//!
//! Entries are loaded once into a [`prefix_trie::PrefixMap`] keyed by
//! [`ipnet::Ipv4Net`], the same structure `xdp-socket`'s `Router` caches
//! kernel routes in — here the routes arrive as an immutable list instead
//! of being queried from the kernel, since routing-table loading is this
//! crate's caller's responsibility, not this crate's.

use ipnet::Ipv4Net;
use prefix_trie::PrefixMap;
use std::net::Ipv4Addr;

/// One routing-table entry as loaded from external configuration.
#[derive(Clone, Debug)]
pub struct RouteRecord {
    pub destination: Ipv4Addr,
    pub mask: Ipv4Addr,
    /// `Ipv4Addr::UNSPECIFIED` (`0.0.0.0`) marks a directly connected route:
    /// the destination itself, not a gateway, is the resolution key.
    pub gateway: Ipv4Addr,
    /// The interface this route forwards through. `spec.md` §9 leaves the
    /// reference implementation transmitting on the *receiving* interface
    /// instead; this crate resolves that open question by transmitting on
    /// the interface the matched route names.
    pub iface: Box<str>,
}

impl RouteRecord {
    pub fn is_direct(&self) -> bool {
        self.gateway.is_unspecified()
    }

    /// The network address whose link address must be resolved to send a
    /// datagram out along this route.
    pub fn resolution_key(&self, destination: Ipv4Addr) -> Ipv4Addr {
        if self.is_direct() {
            destination
        } else {
            self.gateway
        }
    }
}

pub struct RouteTable {
    routes: PrefixMap<Ipv4Net, RouteRecord>,
}

impl RouteTable {
    /// Builds the table from an immutable list of entries. Panics on a
    /// `mask` that isn't a contiguous prefix mask — a malformed static
    /// routing table is a configuration error, not something to route
    /// around at runtime.
    pub fn new(routes: impl IntoIterator<Item = RouteRecord>) -> Self {
        let mut map = PrefixMap::new();
        for route in routes {
            let prefix_len = u32::from(route.mask).count_ones() as u8;
            let net = Ipv4Net::new(route.destination, prefix_len)
                .expect("routing table entry has an invalid destination/mask pair");
            map.insert(net, route);
        }
        RouteTable { routes: map }
    }

    /// Longest-prefix-match lookup: the entry whose mask is at least as
    /// wide as that of any other entry also covering `destination`.
    pub fn resolve_route(&self, destination: Ipv4Addr) -> Option<&RouteRecord> {
        let probe = Ipv4Net::from(destination);
        self.routes.get_lpm(&probe).map(|(_, route)| route)
    }
}
