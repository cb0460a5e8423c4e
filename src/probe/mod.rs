//! Bounded-concurrency liveness and port probes (spec §4.2).

pub mod icmp;
pub mod tcp;

pub use tcp::PortState;
