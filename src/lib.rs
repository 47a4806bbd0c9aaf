#![doc = include_str!("../README.md")]

pub mod cache;
pub mod config;
pub mod handler;
pub mod iface;
pub mod notify;
pub mod route;
pub mod router;
pub mod scheduler;
pub mod transport;
pub mod wire;

pub use cache::ResolutionCache;
pub use config::CacheConfig;
pub use handler::handle;
pub use iface::{InterfaceRecord, InterfaceTable};
pub use route::{RouteRecord, RouteTable};
pub use router::Router;
pub use transport::Transmit;
