//! Unit tests for the command-output parsers (spec §4.5).

use netwalker::model::FamilyTag;
use netwalker::parse::{cdp, hostname, interfaces, lldp, version};

#[test]
fn nxos_version_uses_its_own_patterns() {
    let output = "Cisco Nexus Operating System (NXOS) Software\nNXOS: version 9.3(5)\ncisco Nexus93180YC-EX Chassis\nProcessor Board ID FDO1234ABCD\n";
    let info = version::parse(output, FamilyTag::Nxos);
    assert_eq!(info.os_version.as_deref(), Some("9.3(5)"));
    assert_eq!(info.serial.as_deref(), Some("FDO1234ABCD"));
}

#[test]
fn eos_version_uses_its_own_patterns() {
    let output = "Arista DCS-7050SX3-48YC8\nSoftware image version: 4.27.3M\nSerial number: SSJ12345678\n";
    let info = version::parse(output, FamilyTag::Eos);
    assert_eq!(info.os_version.as_deref(), Some("4.27.3M"));
    assert_eq!(info.model.as_deref(), Some("DCS-7050SX3-48YC8"));
}

#[test]
fn junos_version_uses_its_own_patterns() {
    let output = "Hostname: mx-core-1\nModel: mx240\nJunos: 21.2R1.10\nChassis MX240\n";
    let info = version::parse(output, FamilyTag::Junos);
    assert_eq!(info.os_version.as_deref(), Some("21.2R1.10"));
    assert_eq!(info.model.as_deref(), Some("mx240"));
}

#[test]
fn show_interfaces_fallback_extracts_ip_and_admin_status() {
    let text = "\
GigabitEthernet0/1 is up, line protocol is up
  Description: uplink
  Internet address is 10.1.1.1/30
GigabitEthernet0/2 is administratively down, line protocol is down
  Internet address is 10.1.1.5 255.255.255.252
";
    let ifaces = interfaces::from_show_interfaces(text);
    assert_eq!(ifaces.len(), 2);
    assert_eq!(ifaces[0].ip.as_deref(), Some("10.1.1.1"));
    assert_eq!(ifaces[0].mask.as_deref(), Some("255.255.255.252"));
    assert_eq!(ifaces[0].description.as_deref(), Some("uplink"));
    assert_eq!(ifaces[1].admin_status, netwalker::model::AdminStatus::Down);
}

#[test]
fn juniper_show_interfaces_uses_physical_and_local_blocks() {
    let text = "\
Physical interface: ge-0/0/1, Enabled
  Local: 10.2.2.1/24
Physical interface: ge-0/0/2, Enabled
  Local: 10.2.2.5
";
    let ifaces = interfaces::from_show_interfaces(text);
    assert_eq!(ifaces.len(), 2);
    assert_eq!(ifaces[0].mask.as_deref(), Some("255.255.255.0"));
    // No prefix on the second interface's Local: line falls through the
    // loopback safety net to /32 (spec §4.5, §9).
    assert_eq!(ifaces[1].mask.as_deref(), Some("255.255.255.255"));
}

#[test]
fn interface_brief_separates_loopbacks_from_regular_subnets() {
    let text = "\
Interface              IP-Address      OK? Method Status                Protocol
GigabitEthernet0/1      10.0.0.1/30     YES manual up                    up
Loopback0               10.0.1.1/32     YES manual up                    up
";
    let harvested = interfaces::harvest_from_interface_brief(text);
    assert_eq!(harvested.subnets.len(), 1);
    assert_eq!(harvested.loopbacks, vec!["10.0.1.1".parse::<std::net::IpAddr>().unwrap()]);
}

#[test]
fn route_connected_narrative_form_never_widens_past_slash_32() {
    // spec §9: "incorrectly widening a loopback to /24 would flood the
    // reachability phase" — the narrative form must never infer a wider mask.
    let text = "10.9.9.9 is directly connected, Loopback3\n";
    let subnets = interfaces::harvest_from_route_connected(text);
    assert_eq!(subnets.len(), 1);
    assert_eq!(subnets[0].prefix(), 32);
    assert_eq!(subnets[0].ip().to_string(), "10.9.9.9");
}

#[test]
fn cdp_and_lldp_claims_both_require_hostname_and_ip() {
    let cdp_text = "----\nDevice ID: only-hostname\nPlatform: cisco,  Capabilities: Router\n";
    assert!(cdp::parse(cdp_text).is_empty());

    let lldp_text = "----\nSystem Name: only-hostname\nSystem Capabilities: B\n";
    assert!(lldp::parse(lldp_text).is_empty());
}

#[test]
fn hostname_from_command_output_trims_whitespace() {
    assert_eq!(hostname::from_command_output("  \n  dist-sw-4  \n"), Some("dist-sw-4".to_string()));
}

#[test]
fn hostname_from_config_ignores_hostname_like_text_in_comments() {
    // Only a line that actually starts with `hostname` (at the start of the
    // line) is recognized; indented/commented-out text is not a match.
    let config = "! hostname DECOY\nhostname real-name\n!\n";
    assert_eq!(hostname::from_config(config), Some("real-name".to_string()));
}
