//! # Router Context
//!
//! Bundles the pieces a running router needs: its interfaces, its static
//! routes, its resolution cache, and the transport it hands finished
//! frames to. An explicit, caller-owned instance — not the process-wide
//! singleton the reference design uses for its cache (see `cache/mod.rs`).

use crate::cache::ResolutionCache;
use crate::config::CacheConfig;
use crate::iface::InterfaceTable;
use crate::route::RouteTable;
use crate::transport::Transmit;

pub struct Router<T: Transmit> {
    pub interfaces: InterfaceTable,
    pub routes: RouteTable,
    pub cache: ResolutionCache,
    pub transport: T,
}

impl<T: Transmit> Router<T> {
    pub fn new(interfaces: InterfaceTable, routes: RouteTable, transport: T) -> Self {
        Router::with_config(interfaces, routes, transport, CacheConfig::default())
    }

    pub fn with_config(
        interfaces: InterfaceTable,
        routes: RouteTable,
        transport: T,
        cache_config: CacheConfig,
    ) -> Self {
        Router {
            interfaces,
            routes,
            cache: ResolutionCache::new(cache_config),
            transport,
        }
    }
}
