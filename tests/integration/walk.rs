//! Integration tests for the neighbor-walk engine against the in-memory
//! fake transport (spec §4.8, §8 scenarios S2, S3, S4, S5).

use std::sync::Arc;
use std::time::Duration;

use netwalker::model::{AuthType, Credential, DiscoveryProtocol, DiscoveryStatus, FamilyTag, Seed};
use netwalker::transport::fake::{FakeDevice, FakeTransport};
use netwalker::transport::Transport;

fn cred(username: &str) -> Credential {
    Credential { username: username.to_string(), password: "x".to_string(), enable_secret: None, auth_type: AuthType::Password }
}

fn cdp_claim(hostname: &str, ip: &str, local_if: &str, remote_if: &str) -> String {
    format!(
        "----\nDevice ID: {hostname}\nIP address: {ip}\nPlatform: cisco ISR,  Capabilities: Router\nInterface: {local_if},  Port ID (outgoing port): {remote_if}\nHoldtime: 150 sec\n"
    )
}

async fn run_walk(
    seeds: &[Seed],
    credentials: Vec<Credential>,
    max_depth: u32,
    transport: Arc<dyn Transport>,
) -> std::collections::HashMap<String, netwalker::model::Device> {
    netwalker::walk::run(
        seeds,
        credentials,
        &[],
        vec![DiscoveryProtocol::Cdp],
        max_depth,
        Duration::from_secs(2),
        Duration::from_secs(10),
        4,
        transport,
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn s2_single_device_no_neighbors() {
    let ip: std::net::IpAddr = "192.0.2.10".parse().unwrap();
    let device = FakeDevice::new(FamilyTag::GenericIos).accepting("admin").respond("show hostname", "R1\n");
    let transport: Arc<dyn Transport> = Arc::new(FakeTransport::new().with_device(ip, device));

    let devices = run_walk(&[Seed::parse("192.0.2.10").unwrap()], vec![cred("admin")], 2, transport).await;

    assert_eq!(devices.len(), 1);
    let r1 = &devices["R1"];
    assert_eq!(r1.discovery_status, DiscoveryStatus::Discovered);
    assert!(r1.neighbor_claims.is_empty());
}

#[tokio::test]
async fn s3_bidirectional_claim_enqueues_the_neighbor() {
    let ip1: std::net::IpAddr = "10.1.1.1".parse().unwrap();
    let ip2: std::net::IpAddr = "10.1.1.2".parse().unwrap();

    let r1 = FakeDevice::new(FamilyTag::GenericIos)
        .accepting("admin")
        .respond("show hostname", "R1\n")
        .respond("show cdp neighbors detail", cdp_claim("R2", "10.1.1.2", "Gi0/0", "Gi0/1"));
    let r2 = FakeDevice::new(FamilyTag::GenericIos)
        .accepting("admin")
        .respond("show hostname", "R2\n")
        .respond("show cdp neighbors detail", cdp_claim("R1", "10.1.1.1", "Gi0/1", "Gi0/0"));

    let transport: Arc<dyn Transport> = Arc::new(FakeTransport::new().with_device(ip1, r1).with_device(ip2, r2));
    let devices = run_walk(&[Seed::parse("10.1.1.1").unwrap()], vec![cred("admin")], 2, transport).await;

    assert_eq!(devices.len(), 2);
    assert_eq!(devices["R1"].discovery_status, DiscoveryStatus::Discovered);
    assert_eq!(devices["R2"].discovery_status, DiscoveryStatus::Discovered);
    assert_eq!(devices["R1"].neighbor_claims.len(), 1);
    assert_eq!(devices["R2"].neighbor_claims.len(), 1);
}

#[tokio::test]
async fn s4_auth_failure_then_success_records_the_working_credential() {
    let ip: std::net::IpAddr = "192.0.2.20".parse().unwrap();
    let device = FakeDevice::new(FamilyTag::GenericIos).accepting("good-user").respond("show hostname", "R1\n");
    let transport: Arc<dyn Transport> = Arc::new(FakeTransport::new().with_device(ip, device));

    let devices = run_walk(
        &[Seed::parse("192.0.2.20").unwrap()],
        vec![cred("bad-user"), cred("good-user")],
        2,
        transport,
    )
    .await;

    assert_eq!(devices.len(), 1);
    let r1 = &devices["R1"];
    assert_eq!(r1.discovery_status, DiscoveryStatus::Discovered);
    assert_eq!(r1.credentials_used.as_ref().unwrap().username, "good-user");
}

#[tokio::test]
async fn s5_depth_cap_excludes_the_fourth_hop() {
    let ips: Vec<std::net::IpAddr> =
        ["10.2.0.1", "10.2.0.2", "10.2.0.3", "10.2.0.4"].iter().map(|s| s.parse().unwrap()).collect();
    let names = ["R1", "R2", "R3", "R4"];

    let mut transport = FakeTransport::new();
    for i in 0..4 {
        let mut device = FakeDevice::new(FamilyTag::GenericIos)
            .accepting("admin")
            .respond("show hostname", format!("{}\n", names[i]));
        if i + 1 < 4 {
            device = device.respond(
                "show cdp neighbors detail",
                cdp_claim(names[i + 1], &ips[i + 1].to_string(), "Gi0/0", "Gi0/1"),
            );
        }
        transport = transport.with_device(ips[i], device);
    }

    let devices = run_walk(&[Seed::parse("10.2.0.1").unwrap()], vec![cred("admin")], 2, Arc::new(transport)).await;

    assert_eq!(devices.len(), 3);
    assert!(devices.contains_key("R1"));
    assert!(devices.contains_key("R2"));
    assert!(devices.contains_key("R3"));
    assert!(!devices.contains_key("R4"));
}
