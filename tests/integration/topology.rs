//! Integration tests for the topology builder against hand-assembled
//! device maps (spec §4.9, §8 scenarios S3 and S6).

use std::collections::HashMap;

use netwalker::identity::IdentityTable;
use netwalker::model::{AdminStatus, Device, DiscoveryStatus, FamilyTag, Interface, NeighborClaim};

fn discovered(ip: &str, identity: &str) -> Device {
    let mut d = Device::pending(ip.parse().unwrap());
    d.identity = identity.to_string();
    d.family = Some(FamilyTag::GenericIos);
    d.discovery_status = DiscoveryStatus::Discovered;
    d
}

fn claim(hostname: &str, ip: &str, local_if: &str, remote_if: &str) -> NeighborClaim {
    NeighborClaim {
        hostname: hostname.to_string(),
        ip: ip.parse().unwrap(),
        platform: None,
        local_interface: Some(local_if.to_string()),
        remote_interface: Some(remote_if.to_string()),
        vlan: None,
        capabilities: None,
        holdtime: None,
    }
}

#[test]
fn three_node_chain_yields_two_edges_with_no_self_loops() {
    let identity = IdentityTable::new();
    identity.register("R1", "10.0.0.1".parse().unwrap());
    identity.register("R2", "10.0.0.2".parse().unwrap());
    identity.register("R3", "10.0.0.3".parse().unwrap());

    let mut r1 = discovered("10.0.0.1", "R1");
    r1.interfaces.push(Interface { admin_status: AdminStatus::Up, ..Interface::new("Gi0/0") });
    r1.neighbor_claims.push(claim("R2", "10.0.0.2", "Gi0/0", "Gi0/0"));

    let mut r2 = discovered("10.0.0.2", "R2");
    r2.interfaces.push(Interface { admin_status: AdminStatus::Up, ..Interface::new("Gi0/0") });
    r2.interfaces.push(Interface { admin_status: AdminStatus::Up, ..Interface::new("Gi0/1") });
    r2.neighbor_claims.push(claim("R1", "10.0.0.1", "Gi0/0", "Gi0/0"));
    r2.neighbor_claims.push(claim("R3", "10.0.0.3", "Gi0/1", "Gi0/0"));

    let mut r3 = discovered("10.0.0.3", "R3");
    r3.interfaces.push(Interface { admin_status: AdminStatus::Up, ..Interface::new("Gi0/0") });
    r3.neighbor_claims.push(claim("R2", "10.0.0.2", "Gi0/0", "Gi0/1"));

    let mut devices: HashMap<String, Device> = HashMap::new();
    devices.insert("R1".into(), r1);
    devices.insert("R2".into(), r2);
    devices.insert("R3".into(), r3);

    let (adjacency, edges) = netwalker::topology::build(&mut devices, &identity);

    assert_eq!(edges.len(), 2);
    assert!(edges.iter().all(|e| e.a != e.b));
    assert_eq!(adjacency["R1"], vec!["R2".to_string()]);
    let mut r2_neighbors = adjacency["R2"].clone();
    r2_neighbors.sort();
    assert_eq!(r2_neighbors, vec!["R1".to_string(), "R3".to_string()]);
    assert_eq!(adjacency["R3"], vec!["R2".to_string()]);
}

#[test]
fn loopback_identity_dedup_folds_into_a_single_adjacency_entry() {
    // Scenario S6: R1 has primary IP 10.0.0.1 and loopback 10.0.1.1; R2
    // sees R1's neighbor claim arrive over the loopback address. Only one
    // device should exist for R1, and R2's adjacency should list it once.
    let identity = IdentityTable::new();
    identity.register("R1", "10.0.0.1".parse().unwrap());
    identity.register("R1", "10.0.1.1".parse().unwrap());
    identity.register("R2", "10.0.0.2".parse().unwrap());

    let mut r1 = discovered("10.0.0.1", "R1");
    r1.all_ips.insert("10.0.1.1".parse().unwrap());

    let mut r2 = discovered("10.0.0.2", "R2");
    r2.neighbor_claims.push(claim("R1", "10.0.1.1", "Gi0/0", "Lo0"));

    let mut devices: HashMap<String, Device> = HashMap::new();
    devices.insert("R1".into(), r1);
    devices.insert("R2".into(), r2);

    let (adjacency, edges) = netwalker::topology::build(&mut devices, &identity);

    assert_eq!(devices.len(), 2);
    assert!(devices["R1"].all_ips.contains(&"10.0.0.1".parse().unwrap()));
    assert!(devices["R1"].all_ips.contains(&"10.0.1.1".parse().unwrap()));
    assert_eq!(adjacency["R2"], vec!["R1".to_string()]);
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].b, "R1");
}
