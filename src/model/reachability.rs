//! Reachability matrix records (spec §4.6, §6).

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReachabilityRecord {
    pub ip: IpAddr,
    pub icmp_reachable: bool,
    pub open_ports: Vec<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReachabilityMatrix {
    pub results: Vec<ReachabilityRecord>,
    pub summary: ReachabilitySummary,
    pub duration_sec: f64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReachabilitySummary {
    pub total_scanned: usize,
    pub icmp_reachable: usize,
    /// Keyed `"port_<P>_open"`, flattened alongside the scalar fields above
    /// to match the bit-exact artifact shape in spec §6.
    #[serde(flatten)]
    pub port_counts: std::collections::BTreeMap<String, usize>,
}
