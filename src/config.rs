//! # Resolution Cache Configuration
//!
//! Tunables for the resolution cache and its sweeper, mirroring the way
//! `AfXdpSocket`'s behavior is tuned through `AfXdpConfig` rather than
//! hard-coded constants scattered through the implementation.

use std::time::Duration;

#[derive(Debug, Copy, Clone)]
pub struct CacheConfig {
    /// How long a resolved binding remains usable before it must be
    /// re-resolved.
    pub binding_ttl: Duration,
    /// Maximum number of bindings and pending requests the cache holds at
    /// once.
    pub capacity: usize,
    /// Number of ARP requests sent for a single pending resolution before
    /// giving up and failing every queued frame.
    pub max_retries: u32,
    /// Interval between retry broadcasts, and the scheduler's sweep period.
    pub retry_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            binding_ttl: Duration::from_secs(15),
            capacity: 100,
            max_retries: 5,
            retry_interval: Duration::from_secs(1),
        }
    }
}
