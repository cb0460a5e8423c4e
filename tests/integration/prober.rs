//! Integration tests for the reachability prober against a real loopback
//! listener (spec §4.6, §8 scenario S1).

use std::sync::Arc;
use std::time::Duration;

use ipnetwork::IpNetwork;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;

use netwalker::ports::NullArtifactSink;

#[tokio::test]
async fn open_port_on_loopback_is_reported_as_open() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        loop {
            if listener.accept().await.is_err() {
                break;
            }
        }
    });

    let subnet: IpNetwork = "127.0.0.1/32".parse().unwrap();
    let sink = NullArtifactSink;
    let matrix = netwalker::prober::run(
        "test-job",
        &[subnet],
        &[port],
        Arc::new(Semaphore::new(8)),
        Duration::from_millis(500),
        &sink,
        &[],
    )
    .await
    .unwrap();

    assert_eq!(matrix.summary.total_scanned, 1);
    assert_eq!(matrix.results.len(), 1);
    let record = &matrix.results[0];
    assert_eq!(record.ip.to_string(), "127.0.0.1");
    assert_eq!(record.open_ports, vec![port]);
    assert_eq!(matrix.summary.port_counts[&format!("port_{port}_open")], 1);
}

#[tokio::test]
async fn closed_port_on_loopback_is_reported_as_empty() {
    // Bind then drop to obtain a port nothing is listening on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let subnet: IpNetwork = "127.0.0.1/32".parse().unwrap();
    let sink = NullArtifactSink;
    let matrix = netwalker::prober::run(
        "test-job",
        &[subnet],
        &[port],
        Arc::new(Semaphore::new(8)),
        Duration::from_millis(500),
        &sink,
        &[],
    )
    .await
    .unwrap();

    assert_eq!(matrix.results[0].open_ports, Vec::<u16>::new());
    assert_eq!(matrix.summary.port_counts[&format!("port_{port}_open")], 0);
}

#[tokio::test]
async fn trivial_slash_30_scans_exactly_the_two_usable_hosts() {
    // Scenario S1: 10.0.0.0/30 scanned for port 22 yields exactly two
    // scanned hosts (network/broadcast excluded).
    let subnet: IpNetwork = "10.0.0.0/30".parse().unwrap();
    let sink = NullArtifactSink;
    let matrix = netwalker::prober::run(
        "s1",
        &[subnet],
        &[22],
        Arc::new(Semaphore::new(8)),
        Duration::from_millis(50),
        &sink,
        &[],
    )
    .await
    .unwrap();

    assert_eq!(matrix.summary.total_scanned, 2);
    let ips: Vec<String> = matrix.results.iter().map(|r| r.ip.to_string()).collect();
    assert!(ips.contains(&"10.0.0.1".to_string()));
    assert!(ips.contains(&"10.0.0.2".to_string()));
}

#[tokio::test]
async fn excluded_addresses_are_dropped_before_probing() {
    let subnet: IpNetwork = "10.0.0.0/30".parse().unwrap();
    let sink = NullArtifactSink;
    let exclude = [regex::Regex::new(r"^10\.0\.0\.2$").unwrap()];
    let matrix = netwalker::prober::run(
        "s1-exclude",
        &[subnet],
        &[22],
        Arc::new(Semaphore::new(8)),
        Duration::from_millis(50),
        &sink,
        &exclude,
    )
    .await
    .unwrap();

    assert_eq!(matrix.summary.total_scanned, 1);
    assert_eq!(matrix.results[0].ip.to_string(), "10.0.0.1");
}
