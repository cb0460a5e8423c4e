//! Interface parsing: from running-config (preferred) and from
//! `show interfaces`/`show ip interface brief` fallbacks, plus subnet
//! harvesting (spec §4.5).

use std::net::IpAddr;
use std::sync::OnceLock;

use ipnetwork::IpNetwork;
use regex::Regex;

use crate::model::{AdminStatus, Interface};

/// Converts a CIDR prefix length to a dotted-decimal mask:
/// `m = (0xffffffff << (32-P)) & 0xffffffff` (spec §4.5).
pub fn prefix_to_mask(prefix: u8) -> String {
    let mask: u32 = if prefix == 0 {
        0
    } else {
        (0xffffffffu32 << (32 - prefix as u32)) & 0xffffffff
    };
    std::net::Ipv4Addr::from(mask).to_string()
}

fn interface_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^interface\s+(\S+)\s*$").unwrap())
}
fn ip_addr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^\s*ip address\s+(\d+\.\d+\.\d+\.\d+)\s+(\d+\.\d+\.\d+\.\d+)(\s+secondary)?\s*$").unwrap()
    })
}
fn ip_addr_slash_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\s*ip address\s+(\d+\.\d+\.\d+\.\d+)/(\d{1,2})\s*$").unwrap())
}
fn ip_addr_dhcp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\s*ip address dhcp\s*$").unwrap())
}
fn description_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\s*description\s+(.+?)\s*$").unwrap())
}
fn access_vlan_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\s*switchport access vlan\s+(\d+)\s*$").unwrap())
}

/// Splits running-config into `interface <name> ... !` blocks and extracts
/// each interface's addressing, description, admin status, and VLAN config.
pub fn from_running_config(config: &str) -> Vec<Interface> {
    let mut interfaces = Vec::new();
    let lines: Vec<&str> = config.lines().collect();
    let mut i = 0;
    while i < lines.len() {
        let Some(caps) = interface_header_re().captures(lines[i]) else {
            i += 1;
            continue;
        };
        let name = caps.get(1).unwrap().as_str().to_string();
        let mut block = String::new();
        i += 1;
        while i < lines.len() && lines[i].trim() != "!" {
            block.push_str(lines[i]);
            block.push('\n');
            i += 1;
        }
        interfaces.push(parse_config_block(&name, &block));
    }
    apply_loopback_safety_net(&mut interfaces);
    interfaces
}

fn parse_config_block(name: &str, block: &str) -> Interface {
    let mut iface = Interface::new(name);

    if ip_addr_dhcp_re().is_match(block) {
        iface.ip = Some("dhcp".to_string());
    } else if ip_addr_re().is_match(block) {
        for caps in ip_addr_re().captures_iter(block) {
            let ip = caps.get(1).unwrap().as_str().to_string();
            let mask = caps.get(2).unwrap().as_str().to_string();
            if caps.get(3).is_some() {
                iface.secondary_ips.push((ip, mask));
            } else if iface.ip.is_none() {
                iface.ip = Some(ip);
                iface.mask = Some(mask);
            } else {
                iface.secondary_ips.push((ip, mask));
            }
        }
    } else if let Some(caps) = ip_addr_slash_re().captures(block) {
        let ip = caps.get(1).unwrap().as_str().to_string();
        let prefix: u8 = caps.get(2).unwrap().as_str().parse().unwrap_or(32);
        iface.ip = Some(ip);
        iface.mask = Some(prefix_to_mask(prefix));
    }

    if let Some(caps) = description_re().captures(block) {
        iface.description = Some(caps.get(1).unwrap().as_str().to_string());
    }

    iface.admin_status = if block.lines().any(|l| l.trim() == "shutdown") {
        AdminStatus::Down
    } else {
        AdminStatus::Up
    };

    if let Some(caps) = access_vlan_re().captures(block) {
        iface.access_vlan = caps.get(1).unwrap().as_str().parse().ok();
    }
    iface.trunk = block.lines().any(|l| l.trim() == "switchport mode trunk");

    iface
}

fn cisco_show_interfaces_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^(\S+) is (up|down|administratively down)").unwrap())
}
fn internet_address_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Internet address is (\d+\.\d+\.\d+\.\d+)(?:/(\d{1,2}))?").unwrap())
}
fn description_colon_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Description:\s*(.+)").unwrap())
}
fn line_protocol_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)line protocol is (up|down)").unwrap())
}
fn juniper_physical_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Physical interface:\s*(\S+)").unwrap())
}
fn juniper_local_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Local:\s*(\d+\.\d+\.\d+\.\d+)(?:/(\d{1,2}))?").unwrap())
}

/// Fallback parser for `show interfaces` output when a running-config
/// wasn't available (spec §4.5).
pub fn from_show_interfaces(text: &str) -> Vec<Interface> {
    let mut interfaces = if juniper_physical_re().is_match(text) {
        parse_juniper_show_interfaces(text)
    } else {
        parse_cisco_show_interfaces(text)
    };
    apply_loopback_safety_net(&mut interfaces);
    interfaces
}

fn parse_cisco_show_interfaces(text: &str) -> Vec<Interface> {
    let mut interfaces = Vec::new();
    let headers: Vec<_> = cisco_show_interfaces_header_re().captures_iter(text).collect();
    for (idx, caps) in headers.iter().enumerate() {
        let name = caps.get(1).unwrap().as_str().to_string();
        let start = caps.get(0).unwrap().end();
        let end = headers.get(idx + 1).map(|c| c.get(0).unwrap().start()).unwrap_or(text.len());
        let block = &text[start..end];

        let mut iface = Interface::new(name);
        if let Some(ic) = internet_address_re().captures(block) {
            iface.ip = Some(ic.get(1).unwrap().as_str().to_string());
            if let Some(prefix) = ic.get(2).and_then(|m| m.as_str().parse::<u8>().ok()) {
                iface.mask = Some(prefix_to_mask(prefix));
            }
        }
        if let Some(dc) = description_colon_re().captures(block) {
            iface.description = Some(dc.get(1).unwrap().as_str().trim().to_string());
        }
        iface.admin_status = match line_protocol_re().captures(block) {
            Some(lc) if lc.get(1).unwrap().as_str().eq_ignore_ascii_case("up") => AdminStatus::Up,
            Some(_) => AdminStatus::Down,
            None => AdminStatus::Up,
        };
        interfaces.push(iface);
    }
    interfaces
}

fn parse_juniper_show_interfaces(text: &str) -> Vec<Interface> {
    let mut interfaces = Vec::new();
    let headers: Vec<_> = juniper_physical_re().captures_iter(text).collect();
    for (idx, caps) in headers.iter().enumerate() {
        let name = caps.get(1).unwrap().as_str().to_string();
        let start = caps.get(0).unwrap().end();
        let end = headers.get(idx + 1).map(|c| c.get(0).unwrap().start()).unwrap_or(text.len());
        let block = &text[start..end];

        let mut iface = Interface::new(name);
        if let Some(lc) = juniper_local_re().captures(block) {
            iface.ip = Some(lc.get(1).unwrap().as_str().to_string());
            if let Some(prefix) = lc.get(2).and_then(|m| m.as_str().parse::<u8>().ok()) {
                iface.mask = Some(prefix_to_mask(prefix));
            }
        }
        interfaces.push(iface);
    }
    interfaces
}

/// If an interface has an IP but no mask: loopback-named interfaces default
/// to `/32`; any other IP-bearing interface with no mask also gets `/32` as
/// a last-resort guardrail (spec §4.5).
pub fn apply_loopback_safety_net(interfaces: &mut [Interface]) {
    for iface in interfaces.iter_mut() {
        if iface.ip.is_some() && iface.mask.is_none() {
            iface.mask = Some("255.255.255.255".to_string());
        }
    }
}

fn brief_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^(\S+)\s+(\d+\.\d+\.\d+\.\d+)(?:/(\d{1,2}))?\b").unwrap())
}

pub struct HarvestedSubnets {
    pub subnets: Vec<IpNetwork>,
    pub loopbacks: Vec<IpAddr>,
}

/// From `show ip interface brief`: yields each interface's `(ip, name)`
/// pair as a `/32` subnet when no prefix is given, or the explicit prefix
/// otherwise. Loopback-named interfaces are split out separately (spec
/// §4.5, §4.7).
pub fn harvest_from_interface_brief(text: &str) -> HarvestedSubnets {
    let mut subnets = Vec::new();
    let mut loopbacks = Vec::new();
    for caps in brief_line_re().captures_iter(text) {
        let name = caps.get(1).unwrap().as_str();
        let Ok(ip) = caps.get(2).unwrap().as_str().parse::<IpAddr>() else { continue };
        if name.to_lowercase().starts_with("loopback") || name.to_lowercase().starts_with("lo") {
            loopbacks.push(ip);
            continue;
        }
        let prefix: u8 = caps.get(3).and_then(|m| m.as_str().parse().ok()).unwrap_or(32);
        if let Ok(net) = IpNetwork::new(ip, prefix) {
            subnets.push(net);
        }
    }
    HarvestedSubnets { subnets, loopbacks }
}

fn route_connected_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^[CL]\s+(\d+\.\d+\.\d+\.\d+)/(\d{1,2})").unwrap())
}
fn route_connected_host_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+\.\d+\.\d+\.\d+)\s+is directly connected").unwrap())
}

/// From `show ip route connected`: `C|L A.B.C.D/P` yields that exact
/// network; the narrative `A.B.C.D is directly connected` form (no prefix)
/// yields a `/32` of the host rather than a broader guess (spec §4.5).
pub fn harvest_from_route_connected(text: &str) -> Vec<IpNetwork> {
    let mut subnets = Vec::new();
    for caps in route_connected_prefix_re().captures_iter(text) {
        let ip: IpAddr = match caps.get(1).unwrap().as_str().parse() {
            Ok(ip) => ip,
            Err(_) => continue,
        };
        let prefix: u8 = caps.get(2).unwrap().as_str().parse().unwrap_or(32);
        if let Ok(net) = IpNetwork::new(ip, prefix) {
            subnets.push(net);
        }
    }
    for caps in route_connected_host_re().captures_iter(text) {
        let ip: IpAddr = match caps.get(1).unwrap().as_str().parse() {
            Ok(ip) => ip,
            Err(_) => continue,
        };
        if let Ok(net) = IpNetwork::new(ip, 32) {
            subnets.push(net);
        }
    }
    subnets
}
