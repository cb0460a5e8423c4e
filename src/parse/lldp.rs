//! LLDP neighbor parsing (spec §4.5).

use std::sync::OnceLock;

use regex::Regex;

use crate::model::NeighborClaim;

fn section_split_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-{4,}|={4,}").unwrap())
}
fn system_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"System Name:\s*([\w.\-]+)").unwrap())
}
fn mgmt_addr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Management Address(?:\(\w+\))?:\s*([\d.]+)").unwrap())
}
fn system_description_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"System Description:\s*\n?\s*([^\n]+)").unwrap())
}
fn capabilities_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)System Capabilities:\s*(.+?)$").unwrap())
}
fn local_interface_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Local Interface:\s*([^\n]+)").unwrap())
}
fn remote_interface_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Port(?:\s+|\s+Description|\s+ID|\s+id):\s*([^\n]+)").unwrap())
}
fn holdtime_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Time remaining:\s*(\d+)\s*seconds").unwrap())
}
fn vlan_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"VLAN:\s*(\d+)").unwrap())
}

/// Sections separated by 4+ hyphens *or* equals signs (Cisco/Arista
/// variants). Juniper's brief columnar table is handled by
/// [`parse_juniper_brief`] since it carries no section markers at all.
pub fn parse(output: &str) -> Vec<NeighborClaim> {
    let mut neighbors = Vec::new();
    for section in section_split_re().split(output) {
        if section.trim().is_empty() {
            continue;
        }
        let hostname = system_name_re().captures(section).and_then(|c| c.get(1)).map(|m| m.as_str().to_string());
        let ip = mgmt_addr_re()
            .captures(section)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok());
        let (Some(hostname), Some(ip)) = (hostname, ip) else { continue };

        neighbors.push(NeighborClaim {
            hostname,
            ip,
            platform: system_description_re()
                .captures(section)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string()),
            local_interface: local_interface_re()
                .captures(section)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string()),
            remote_interface: remote_interface_re()
                .captures(section)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string()),
            vlan: vlan_re().captures(section).and_then(|c| c.get(1)).and_then(|m| m.as_str().parse().ok()),
            capabilities: capabilities_re()
                .captures(section)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string()),
            holdtime: holdtime_re().captures(section).and_then(|c| c.get(1)).and_then(|m| m.as_str().parse().ok()),
        });
    }
    neighbors
}

/// Juniper's brief neighbor table has no IP column at all — just
/// `Local Interface  Parent Interface  Chassis Id  Port info  System Name`
/// rows. Hostname and local/remote interface are the only fields we can
/// recover from it; the IP must come from a later detailed lookup, which
/// this crate does not perform, so these claims carry a zero-address
/// placeholder the walk engine filters out before enqueueing.
pub fn parse_juniper_brief(output: &str) -> Vec<NeighborClaim> {
    let mut neighbors = Vec::new();
    for line in output.lines() {
        if line.contains("Local Interface") || line.contains("Parent Interface") || line.trim().is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            continue;
        }
        neighbors.push(NeighborClaim {
            hostname: parts[2].to_string(),
            ip: std::net::Ipv4Addr::UNSPECIFIED.into(),
            platform: None,
            local_interface: Some(parts[0].to_string()),
            remote_interface: Some(parts[1].to_string()),
            vlan: None,
            capabilities: None,
            holdtime: None,
        });
    }
    neighbors
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
------------------------------------------------
System Name: sw-access-12

System Description:
Cisco IOS Software, C3750 Software

Local Interface: Gi1/0/24
Port id: Gi0/1
Management Address: 10.2.2.2
System Capabilities: B, R
Time remaining: 98 seconds
VLAN: 5
";

    #[test]
    fn extracts_a_full_claim() {
        let claims = parse(SAMPLE);
        assert_eq!(claims.len(), 1);
        let c = &claims[0];
        assert_eq!(c.hostname, "sw-access-12");
        assert_eq!(c.ip.to_string(), "10.2.2.2");
        assert_eq!(c.local_interface.as_deref(), Some("Gi1/0/24"));
        assert_eq!(c.remote_interface.as_deref(), Some("Gi0/1"));
        assert_eq!(c.holdtime, Some(98));
        assert_eq!(c.vlan, Some(5));
    }

    #[test]
    fn juniper_brief_rows_skip_header() {
        let text = "Local Interface  Parent Interface  Chassis Id  Port info\nge-0/0/1 ge-0/0/2 mx-edge-2 00:11:22\n";
        let claims = parse_juniper_brief(text);
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].local_interface.as_deref(), Some("ge-0/0/1"));
        assert_eq!(claims[0].remote_interface.as_deref(), Some("ge-0/0/2"));
        assert_eq!(claims[0].hostname, "mx-edge-2");
    }
}
