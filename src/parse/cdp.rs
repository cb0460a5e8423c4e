//! CDP neighbor parsing (spec §4.5).

use std::sync::OnceLock;

use regex::Regex;

use crate::model::NeighborClaim;

fn section_split_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-{4,}").unwrap())
}
fn device_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Device ID:\s*([\w.\-]+)").unwrap())
}
fn ip_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"IP(?:v4)? address:\s*([\d.]+)").unwrap())
}
fn platform_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Platform:\s*([^,]+),").unwrap())
}
fn capabilities_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)Capabilities:\s*(.+?)$").unwrap())
}
fn local_interface_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Interface:\s*([^,]+),").unwrap())
}
fn remote_interface_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)Port ID \(outgoing port\):\s*(.+?)$").unwrap())
}
fn holdtime_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Holdtime:\s*(\d+)\s*sec").unwrap())
}
fn native_vlan_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Native VLAN:\s*(\d+)").unwrap())
}

/// Sections are separated by 4+ hyphens. A claim is only emitted when both
/// hostname and IP are present in the same section (spec §4.5).
pub fn parse(output: &str) -> Vec<NeighborClaim> {
    let mut neighbors = Vec::new();
    for section in section_split_re().split(output) {
        if section.trim().is_empty() {
            continue;
        }
        let hostname = device_id_re().captures(section).and_then(|c| c.get(1)).map(|m| m.as_str().to_string());
        let ip = ip_re()
            .captures(section)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok());

        let (Some(hostname), Some(ip)) = (hostname, ip) else { continue };

        neighbors.push(NeighborClaim {
            hostname,
            ip,
            platform: platform_re().captures(section).and_then(|c| c.get(1)).map(|m| m.as_str().trim().to_string()),
            local_interface: local_interface_re()
                .captures(section)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string()),
            remote_interface: remote_interface_re()
                .captures(section)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string()),
            vlan: native_vlan_re().captures(section).and_then(|c| c.get(1)).and_then(|m| m.as_str().parse().ok()),
            capabilities: capabilities_re()
                .captures(section)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string()),
            holdtime: holdtime_re().captures(section).and_then(|c| c.get(1)).and_then(|m| m.as_str().parse().ok()),
        });
    }
    neighbors
}
