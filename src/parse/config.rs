//! Running-config structure extraction: vlans, routing, ACLs (spec §4.5
//! supplement).

use std::sync::OnceLock;

use regex::Regex;

use crate::model::config::{AclEntry, BgpInfo, BgpNeighbor, OspfInfo, OspfNetwork, ParsedConfig, RoutingInfo, StaticRoute, VlanEntry};

use super::hostname;

fn vlan_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^vlan\s+(\d+)\n(?:.+\n)*?(?=^!|\z)").unwrap())
}
fn vlan_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\s*name\s+(.+?)\s*$").unwrap())
}
fn static_route_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^ip route\s+(\d+\.\d+\.\d+\.\d+)\s+(\d+\.\d+\.\d+\.\d+)\s+(\d+\.\d+\.\d+\.\d+|\S+)").unwrap()
    })
}
fn ospf_process_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^router ospf\s+(\d+)").unwrap())
}
fn ospf_network_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\s*network\s+(\d+\.\d+\.\d+\.\d+)\s+(\d+\.\d+\.\d+\.\d+)\s+area\s+(\d+)").unwrap())
}
fn bgp_as_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^router bgp\s+(\d+)").unwrap())
}
fn bgp_neighbor_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\s*neighbor\s+(\d+\.\d+\.\d+\.\d+)\s+remote-as\s+(\d+)").unwrap())
}
fn acl_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^(ip access-list \S+|access-list \d+)").unwrap())
}

/// Parses everything a running-config yields beyond the interface blocks
/// that [`crate::parse::interfaces`] already owns.
pub fn parse(config: &str) -> ParsedConfig {
    ParsedConfig {
        hostname: hostname::from_config(config),
        vlans: extract_vlans(config),
        routing: extract_routing(config),
        acls: extract_acls(config),
    }
}

fn extract_vlans(config: &str) -> Vec<VlanEntry> {
    vlan_block_re()
        .find_iter(config)
        .filter_map(|m| {
            let block = m.as_str();
            let first_line = block.lines().next()?;
            let vlan_id: u32 = first_line.split_whitespace().nth(1)?.parse().ok()?;
            let name = vlan_name_re().captures(block).and_then(|c| c.get(1)).map(|g| g.as_str().to_string());
            Some(VlanEntry { vlan_id, name })
        })
        .collect()
}

fn extract_routing(config: &str) -> RoutingInfo {
    let static_routes = static_route_re()
        .captures_iter(config)
        .map(|c| StaticRoute {
            network: c.get(1).unwrap().as_str().to_string(),
            mask: c.get(2).unwrap().as_str().to_string(),
            next_hop: c.get(3).unwrap().as_str().to_string(),
        })
        .collect();

    let ospf = ospf_process_re().captures(config).and_then(|c| c.get(1)?.as_str().parse::<u32>().ok()).map(|process_id| {
        let networks = ospf_network_re()
            .captures_iter(config)
            .map(|c| OspfNetwork {
                network: c.get(1).unwrap().as_str().to_string(),
                wildcard: c.get(2).unwrap().as_str().to_string(),
                area: c.get(3).unwrap().as_str().parse().unwrap_or(0),
            })
            .collect();
        OspfInfo { process_id, networks }
    });

    let bgp = bgp_as_re().captures(config).and_then(|c| c.get(1)?.as_str().parse::<u32>().ok()).map(|as_number| {
        let neighbors = bgp_neighbor_re()
            .captures_iter(config)
            .map(|c| BgpNeighbor {
                ip_address: c.get(1).unwrap().as_str().to_string(),
                remote_as: c.get(2).unwrap().as_str().parse().unwrap_or(0),
            })
            .collect();
        BgpInfo { as_number, neighbors }
    });

    RoutingInfo { static_routes, ospf, bgp }
}

fn extract_acls(config: &str) -> Vec<AclEntry> {
    let headers: Vec<_> = acl_header_re().captures_iter(config).collect();
    headers
        .iter()
        .enumerate()
        .map(|(idx, caps)| {
            let name = caps.get(1).unwrap().as_str().to_string();
            let start = caps.get(0).unwrap().start();
            let end = headers
                .get(idx + 1)
                .map(|c| c.get(0).unwrap().start())
                .unwrap_or(config.len());
            AclEntry { name, raw_config: config[start..end].to_string() }
        })
        .collect()
}
