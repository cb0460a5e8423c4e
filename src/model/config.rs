//! Structured view of a device's running configuration.
//!
//! Interfaces parsed from config land on `Device.interfaces` directly (spec
//! §4.5); `ParsedConfig` carries the remaining structure a config yields —
//! vlans, routing, ACLs — enriching `Device.parsed_config` beyond what
//! spec §4.5 names explicitly.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedConfig {
    pub hostname: Option<String>,
    pub vlans: Vec<VlanEntry>,
    pub routing: RoutingInfo,
    pub acls: Vec<AclEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VlanEntry {
    pub vlan_id: u32,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutingInfo {
    pub static_routes: Vec<StaticRoute>,
    pub ospf: Option<OspfInfo>,
    pub bgp: Option<BgpInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticRoute {
    pub network: String,
    pub mask: String,
    pub next_hop: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OspfInfo {
    pub process_id: u32,
    pub networks: Vec<OspfNetwork>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OspfNetwork {
    pub network: String,
    pub wildcard: String,
    pub area: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BgpInfo {
    pub as_number: u32,
    pub neighbors: Vec<BgpNeighbor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BgpNeighbor {
    pub ip_address: String,
    pub remote_as: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AclEntry {
    pub name: String,
    pub raw_config: String,
}
