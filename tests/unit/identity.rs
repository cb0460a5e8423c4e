//! Unit tests for the identity/dedup table (spec §3, §4.8c, §8 property 4).

use netwalker::identity::IdentityTable;

#[test]
fn interface_ip_registers_under_the_owning_hostname() {
    let table = IdentityTable::new();
    let loopback: std::net::IpAddr = "10.0.1.1".parse().unwrap();
    let found = table.register_interface_ip("R1", "10.0.1.1");
    assert_eq!(found, Some(loopback));
    assert_eq!(table.hostname_for(loopback).as_deref(), Some("R1"));
}

#[test]
fn malformed_interface_ip_is_ignored() {
    let table = IdentityTable::new();
    assert_eq!(table.register_interface_ip("R1", "not-an-ip"), None);
}

#[test]
fn two_distinct_hostnames_stay_distinct() {
    // Property 4 — identity injectivity: two valid hostnames never collapse
    // onto the same entry.
    let table = IdentityTable::new();
    table.register("R1", "10.0.0.1".parse().unwrap());
    table.register("R2", "10.0.0.2".parse().unwrap());
    assert_ne!(table.hostname_for("10.0.0.1".parse().unwrap()), table.hostname_for("10.0.0.2".parse().unwrap()));
}

#[test]
fn unvisited_ip_is_not_known_until_registered() {
    let table = IdentityTable::new();
    let ip: std::net::IpAddr = "192.0.2.5".parse().unwrap();
    assert!(!table.is_known(ip));
    assert!(!table.is_visited(ip));
}

#[test]
fn re_registering_the_same_ip_under_one_hostname_does_not_duplicate() {
    let table = IdentityTable::new();
    let ip: std::net::IpAddr = "10.0.0.1".parse().unwrap();
    table.register("R1", ip);
    table.register("R1", ip);
    assert_eq!(table.ips_for_hostname("R1"), vec![ip]);
}
