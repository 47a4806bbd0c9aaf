//! # Interface Table
//!
//! ## Purpose
//!
//! An immutable lookup of this router's own interfaces by name, each
//! carrying the link address and network address the forwarding path and
//! resolution cache need to address local replies and queries.
//!
//! ## Lifetime
//!
//! Built once from external configuration at startup (interface
//! enumeration is the transport's job, not this crate's) and never mutated
//! afterwards, so lookups need no locking.

use std::collections::HashMap;
use std::net::Ipv4Addr;

#[derive(Clone, Debug)]
pub struct InterfaceRecord {
    pub name: Box<str>,
    pub link_addr: [u8; 6],
    pub net_addr: Ipv4Addr,
}

pub struct InterfaceTable {
    by_name: HashMap<Box<str>, InterfaceRecord>,
}

impl InterfaceTable {
    pub fn new(interfaces: impl IntoIterator<Item = InterfaceRecord>) -> Self {
        InterfaceTable {
            by_name: interfaces.into_iter().map(|r| (r.name.clone(), r)).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&InterfaceRecord> {
        self.by_name.get(name)
    }

    /// Returns the interface whose network address is `addr`, i.e. `addr`
    /// is local to this router rather than something to forward toward.
    pub fn find_by_net_addr(&self, addr: Ipv4Addr) -> Option<&InterfaceRecord> {
        self.by_name.values().find(|r| r.net_addr == addr)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InterfaceRecord> {
        self.by_name.values()
    }
}
