//! Topology builder (spec §4.9, component I).
//!
//! Runs once after the walk quiesces: canonicalizes neighbor claims into a
//! deduplicated, undirected edge set and a set-semantics adjacency map, and
//! cross-links each edge onto the owning interface's `connected_to` field.

use std::collections::HashMap;

use crate::identity::IdentityTable;
use crate::model::{Device, DiscoveryStatus, Edge};

/// Resolves a neighbor claim's IP to the canonical identity of a
/// `discovered` device in `devices`, if any.
fn resolve_identity(devices: &HashMap<String, Device>, identity: &IdentityTable, ip: std::net::IpAddr) -> Option<String> {
    if let Some(hostname) = identity.hostname_for(ip) {
        if devices.contains_key(&hostname) {
            return Some(hostname);
        }
    }
    let ip_key = ip.to_string();
    if devices.contains_key(&ip_key) {
        return Some(ip_key);
    }
    None
}

/// Builds the adjacency map and edge set from `devices`' neighbor claims
/// (spec §4.9). Mutates each device's interface `connected_to` field in
/// place for every edge that resolves to a named local interface.
pub fn build(devices: &mut HashMap<String, Device>, identity: &IdentityTable) -> (HashMap<String, Vec<String>>, Vec<Edge>) {
    let mut adjacency: HashMap<String, Vec<String>> = HashMap::new();
    for (id, device) in devices.iter() {
        if device.discovery_status == DiscoveryStatus::Discovered {
            adjacency.entry(id.clone()).or_default();
        }
    }

    // Pass 1: resolve every claim to a (self, neighbor, local_if, remote_if)
    // tuple without touching `devices` mutably, since the identity lookup
    // needs an immutable borrow across the whole map.
    struct Resolved {
        self_id: String,
        neighbor_id: String,
        local_if: Option<String>,
        remote_if: Option<String>,
    }
    let mut resolved = Vec::new();
    for (id, device) in devices.iter() {
        if device.discovery_status != DiscoveryStatus::Discovered {
            continue;
        }
        for claim in &device.neighbor_claims {
            if claim.ip.is_unspecified() {
                continue;
            }
            let Some(neighbor_id) = resolve_identity(devices, identity, claim.ip) else { continue };
            if neighbor_id == *id {
                continue;
            }
            if let Some(list) = adjacency.get_mut(id) {
                if !list.contains(&neighbor_id) {
                    list.push(neighbor_id.clone());
                }
            }
            resolved.push(Resolved {
                self_id: id.clone(),
                neighbor_id,
                local_if: claim.local_interface.clone(),
                remote_if: claim.remote_interface.clone(),
            });
        }
    }

    // Pass 2: fold into the undirected edge set, skipping the reverse of an
    // edge already present (spec §4.9, §8 property 5).
    let mut edges: Vec<Edge> = Vec::new();
    for r in resolved {
        let candidate = Edge::new(r.self_id.clone(), r.neighbor_id.clone(), r.local_if.clone(), r.remote_if.clone());
        if edges.iter().any(|e| e.matches_undirected(&candidate)) {
            continue;
        }
        edges.push(candidate);

        if let Some(local_if) = &r.local_if {
            if let Some(device) = devices.get_mut(&r.self_id) {
                if let Some(iface) = device.interface_mut(local_if) {
                    let remote_port = r.remote_if.as_deref().unwrap_or("");
                    iface.connected_to = Some(format!("{}:{}", r.neighbor_id, remote_port));
                }
            }
        }
    }

    (adjacency, edges)
}
