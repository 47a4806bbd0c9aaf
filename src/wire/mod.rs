//! # Wire Codecs
//!
//! ## Purpose
//!
//! Zero-copy, bounds-checked views and constructors for the four wire
//! formats this router speaks: Ethernet II framing, the Ethernet/IPv4 ARP
//! message, the 20-byte IPv4 header, and the ICMP variants used for local
//! replies and error notifications.
//!
//! ## How it works
//!
//! Each format gets its own submodule with a `new_checked` view over a
//! borrowed byte slice (returning `None` rather than panicking on a
//! malformed buffer) and free `build` functions for constructing a fresh
//! header into caller-owned storage. There is deliberately no struct
//! overlay onto raw bytes — every field access goes through an explicit
//! bounds-checked accessor, so a truncated or malformed frame becomes a
//! parse failure instead of undefined behavior.

pub mod arp;
pub mod checksum;
pub mod ethernet;
pub mod icmp;
pub mod ipv4;
