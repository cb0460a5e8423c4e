//! Seed introspector (spec §4.7, component G).
//!
//! Logs in to operator-submitted seeds directly (no BFS fan-out — that's
//! `walk`'s job) and harvests interfaces, connected routes, and loopback
//! addresses to synthesize a subnet list for the reachability prober.

use std::collections::HashMap;
use std::net::IpAddr;
use std::time::Duration;

use ipnetwork::IpNetwork;

use crate::dispatch::{command_for, Operation};
use crate::identity::IdentityTable;
use crate::model::{Credential, Device, DiscoveryStatus, FamilyTag, Seed};
use crate::transport::Transport;

/// What the introspector hands back to the orchestrator: subnets to feed
/// the reachability prober, and whatever Device records it managed to
/// populate directly (spec §4.7 — "Return {subnets, devices}").
#[derive(Default)]
pub struct IntrospectionResult {
    pub subnets: Vec<IpNetwork>,
    pub devices: HashMap<String, Device>,
}

/// Runs the introspection pass over every seed. Seeds that are themselves
/// `Subnet` values are skipped — introspection only logs in to single
/// hosts (spec §4.7 operates on "seeds", and subnets have nothing to log
/// into).
pub async fn run(
    seeds: &[Seed],
    credentials: &[Credential],
    transport: &dyn Transport,
    timeout: Duration,
    identity: &IdentityTable,
) -> IntrospectionResult {
    let mut result = IntrospectionResult::default();

    for seed in seeds {
        let (address, port) = match seed {
            Seed::SingleHost { address, port } => (address.clone(), port.unwrap_or(22)),
            Seed::Subnet(_) => continue,
        };
        let Ok(ip): Result<IpAddr, _> = address.parse() else { continue };

        if let Some(device) = introspect_one(ip, port, credentials, transport, timeout, identity).await {
            result.subnets.extend(device.harvested_subnets.clone());
            result.devices.insert(device.record.identity.clone(), device.record);
        }
    }

    result
}

struct Introspected {
    record: Device,
    harvested_subnets: Vec<IpNetwork>,
}

async fn introspect_one(
    ip: IpAddr,
    port: u16,
    credentials: &[Credential],
    transport: &dyn Transport,
    timeout: Duration,
    identity: &IdentityTable,
) -> Option<Introspected> {
    for cred in credentials {
        let family = match transport.detect_family(ip, port, cred, timeout).await {
            Ok(Some(f)) => f,
            _ => FamilyTag::GenericIos,
        };

        let session = match transport.connect(ip, port, cred, family, timeout).await {
            Ok(s) => s,
            Err(_) => continue,
        };

        let brief = session.send(command_for(family, Operation::Interfaces), timeout).await.unwrap_or_default();
        let show_interfaces = session.send("show interfaces", timeout).await.unwrap_or_default();
        let route_connected = session
            .send("show ip route connected", timeout)
            .await
            .unwrap_or_default();
        let cdp = session
            .send(command_for(family, Operation::CdpNeighbors), timeout)
            .await
            .unwrap_or_default();
        let config = session.send(command_for(family, Operation::Config), timeout).await.unwrap_or_default();
        let hostname_output = session.send(command_for(family, Operation::Hostname), timeout).await.unwrap_or_default();
        session.close().await;

        let mut device = Device::pending(ip);
        device.family = Some(family);

        let hostname = crate::parse::hostname::from_config(&config)
            .or_else(|| crate::parse::hostname::from_command_output(&hostname_output));
        if let Some(h) = &hostname {
            device.identity = h.clone();
            identity.register(h, ip);
        }

        let mut interfaces = crate::parse::interfaces::from_running_config(&config);
        if interfaces.is_empty() {
            interfaces = crate::parse::interfaces::from_show_interfaces(&show_interfaces);
        }
        crate::parse::interfaces::apply_loopback_safety_net(&mut interfaces);
        for iface in &interfaces {
            if let Some(ip_str) = &iface.ip {
                if let Some(found) = identity.register_interface_ip(device.identity.as_str(), ip_str) {
                    device.all_ips.insert(found);
                }
            }
            for (sec_ip, _mask) in &iface.secondary_ips {
                if let Some(found) = identity.register_interface_ip(device.identity.as_str(), sec_ip) {
                    device.all_ips.insert(found);
                }
            }
        }
        device.interfaces = interfaces;
        device.raw_config = Some(config.clone());
        device.parsed_config = Some(crate::parse::config::parse(&config));
        device.neighbor_claims = crate::parse::cdp::parse(&cdp);
        device.discovery_status = DiscoveryStatus::Discovered;
        device.credentials_used = Some(cred.redact(port));

        let harvested = crate::parse::interfaces::harvest_from_interface_brief(&brief);
        let mut subnets = harvested.subnets;
        subnets.extend(crate::parse::interfaces::harvest_from_route_connected(&route_connected));
        for loopback in harvested.loopbacks {
            device.all_ips.insert(loopback);
            if let Ok(net) = IpNetwork::new(loopback, 32) {
                subnets.push(net);
            }
        }

        return Some(Introspected { record: device, harvested_subnets: subnets });
    }
    None
}
