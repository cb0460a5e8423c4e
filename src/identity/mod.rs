//! Identity & deduplication layer (spec §3, §4.8, component H's bookkeeping).
//!
//! Maps discovered IPs to a canonical device identity via hostname and
//! interface-IP harvesting. Backed by `dashmap` for lock-free concurrent
//! access from the walk engine's worker pool (spec §5 — "Mutations to the
//! identity map... happen inside a short critical section per device").

use std::net::IpAddr;

use dashmap::{DashMap, DashSet};

/// The sentinel value `parse::interfaces` / device model store for a DHCP
/// interface with no address yet (spec §4.5, §4.8c). Never registered.
const DHCP_SENTINEL: &str = "dhcp";

/// Shared, concurrent identity/visited bookkeeping for one job run.
///
/// `ip_to_hostname` and `hostname_to_ips` are kept in sync by
/// [`IdentityTable::register`]; callers never write to the maps directly.
#[derive(Default)]
pub struct IdentityTable {
    ip_to_hostname: DashMap<IpAddr, String>,
    hostname_to_ips: DashMap<String, Vec<IpAddr>>,
    visited: DashSet<IpAddr>,
}

impl IdentityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `ip` under `hostname` if `hostname` is a trustworthy
    /// identity (spec §4.8c). No-op for empty/error-echo hostnames.
    pub fn register(&self, hostname: &str, ip: IpAddr) {
        if hostname.trim().is_empty() || crate::model::device::looks_like_error_echo(hostname) {
            return;
        }
        self.ip_to_hostname.insert(ip, hostname.to_string());
        let mut ips = self.hostname_to_ips.entry(hostname.to_string()).or_default();
        if !ips.contains(&ip) {
            ips.push(ip);
        }
    }

    /// Registers every interface/secondary IP string found on a device,
    /// skipping the `"dhcp"` sentinel (spec §4.8c).
    pub fn register_interface_ip(&self, hostname: &str, ip_str: &str) -> Option<IpAddr> {
        if ip_str.eq_ignore_ascii_case(DHCP_SENTINEL) {
            return None;
        }
        let ip: IpAddr = ip_str.parse().ok()?;
        self.register(hostname, ip);
        Some(ip)
    }

    /// The hostname already known for `ip`, if any (spec §4.8 step 2 — the
    /// dedup check before a fresh dequeue starts work).
    pub fn hostname_for(&self, ip: IpAddr) -> Option<String> {
        self.ip_to_hostname.get(&ip).map(|r| r.clone())
    }

    /// True if `ip` maps to a hostname already discovered under a different IP.
    pub fn is_known(&self, ip: IpAddr) -> bool {
        self.ip_to_hostname.contains_key(&ip)
    }

    pub fn ips_for_hostname(&self, hostname: &str) -> Vec<IpAddr> {
        self.hostname_to_ips.get(hostname).map(|r| r.clone()).unwrap_or_default()
    }

    /// Marks `ip` visited. Returns `true` if this call was the first to do so
    /// (spec §3 "No IP is enqueued twice", §8 property 3).
    pub fn mark_visited(&self, ip: IpAddr) -> bool {
        self.visited.insert(ip)
    }

    pub fn is_visited(&self, ip: IpAddr) -> bool {
        self.visited.contains(&ip)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
