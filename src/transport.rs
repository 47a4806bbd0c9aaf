//! # Transport
//!
//! ## Purpose
//!
//! The forwarding core never opens a socket itself — sending a frame is
//! abstracted behind [`Transmit`], the same way `xdp-socket`'s `Socket<_TX>`
//! separates ring-buffer mechanics from the higher-level `send` call. Tests
//! use an in-memory implementation; a real deployment plugs in whatever
//! carries frames to the wire (an AF_XDP socket, a raw socket, a tun device).

use std::io;

/// Something this router can hand a complete Ethernet frame to for
/// transmission on a named interface.
pub trait Transmit {
    /// Sends `frame` (a complete Ethernet II frame, header included) out of
    /// the interface named `iface`.
    fn transmit(&self, iface: &str, frame: &[u8]) -> Result<(), io::Error>;
}
