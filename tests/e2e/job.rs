//! End-to-end tests driving the whole job orchestrator (spec §4.10, §8
//! property 8 and scenarios S1/S3).

use std::sync::Arc;
use std::time::Duration;

use netwalker::model::{AuthType, Credential, DiscoveryProtocol, JobSpec, JobStatus, Mode, Seed};
use netwalker::ports::{CapturingEventSink, EventSink, FsArtifactSink, NullArtifactSink};
use netwalker::transport::fake::{FakeDevice, FakeTransport};
use netwalker::transport::Transport;

fn base_spec(seeds: Vec<Seed>, mode: Mode, password: &str) -> JobSpec {
    JobSpec {
        seed_devices: seeds,
        credentials: vec![Credential {
            username: "admin".into(),
            password: password.into(),
            enable_secret: Some("enable-secret-value".into()),
            auth_type: AuthType::Password,
        }],
        mode,
        max_depth: 3,
        discovery_protocols: vec![DiscoveryProtocol::Cdp],
        timeout: Duration::from_secs(2),
        concurrent_connections: 4,
        exclude_patterns: vec![],
        probe_ports: vec![22],
        probe_concurrency: 50,
        job_id: Some("e2e-test-job".to_string()),
    }
}

fn cdp_claim(hostname: &str, ip: &str, local_if: &str, remote_if: &str) -> String {
    format!(
        "----\nDevice ID: {hostname}\nIP address: {ip}\nPlatform: cisco ISR,  Capabilities: Router\nInterface: {local_if},  Port ID (outgoing port): {remote_if}\nHoldtime: 150 sec\n"
    )
}

#[tokio::test]
async fn full_pipeline_two_device_walk_produces_a_topology() {
    let ip1: std::net::IpAddr = "10.3.1.1".parse().unwrap();
    let ip2: std::net::IpAddr = "10.3.1.2".parse().unwrap();

    let r1 = FakeDevice::new(netwalker::model::FamilyTag::GenericIos)
        .accepting("admin")
        .respond("show hostname", "R1\n")
        .respond("show cdp neighbors detail", cdp_claim("R2", "10.3.1.2", "Gi0/0", "Gi0/1"));
    let r2 = FakeDevice::new(netwalker::model::FamilyTag::GenericIos)
        .accepting("admin")
        .respond("show hostname", "R2\n")
        .respond("show cdp neighbors detail", cdp_claim("R1", "10.3.1.1", "Gi0/1", "Gi0/0"));

    let transport: Arc<dyn Transport> = Arc::new(FakeTransport::new().with_device(ip1, r1).with_device(ip2, r2));
    let sink = Arc::new(NullArtifactSink);
    let events_sink = Arc::new(CapturingEventSink::new());
    let events: Arc<dyn EventSink> = events_sink.clone();

    let spec = base_spec(vec![Seed::parse("10.3.1.1").unwrap()], Mode::FullPipeline, "correct-horse-battery-staple");
    let result = netwalker::job::run_job(spec, transport, sink, events).await.unwrap();

    assert_eq!(result.status, JobStatus::Completed);
    assert_eq!(result.counters.total, 2);
    assert_eq!(result.counters.discovered, 2);
    assert_eq!(result.edges.len(), 1);
    assert_eq!(result.adjacency["R1"], vec!["R2".to_string()]);
    assert_eq!(result.adjacency["R2"], vec!["R1".to_string()]);

    let events = events_sink.events().await;
    for (_level, fields) in &events {
        let rendered = fields.to_string();
        assert!(!rendered.contains("correct-horse-battery-staple"));
        assert!(!rendered.contains("enable-secret-value"));
    }
}

#[tokio::test]
async fn subnet_mode_writes_the_reachability_artifact_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let sink = Arc::new(FsArtifactSink::new(dir.path()));
    let events = Arc::new(CapturingEventSink::new());
    let transport: Arc<dyn Transport> = Arc::new(FakeTransport::new());

    let spec = base_spec(vec![Seed::parse("127.0.0.1/32").unwrap()], Mode::Subnet, "unused");
    let result = netwalker::job::run_job(spec, transport, sink, events).await.unwrap();

    assert_eq!(result.status, JobStatus::Completed);
    let reachability = result.reachability.expect("subnet mode always produces a matrix");
    assert_eq!(reachability.summary.total_scanned, 1);

    let artifact_path = dir.path().join("e2e-test-job").join("reachability_matrix.json");
    assert!(artifact_path.exists());
    let contents = std::fs::read_to_string(&artifact_path).unwrap();
    assert!(contents.contains("\"results\""));
    assert!(contents.contains("\"summary\""));
}

#[tokio::test]
async fn subnet_mode_skips_excluded_addresses() {
    let sink = Arc::new(NullArtifactSink);
    let events = Arc::new(CapturingEventSink::new());
    let transport: Arc<dyn Transport> = Arc::new(FakeTransport::new());

    let mut spec = base_spec(vec![Seed::parse("10.0.0.0/30").unwrap()], Mode::Subnet, "unused");
    spec.exclude_patterns = vec![r"^10\.0\.0\.2$".to_string()];
    let result = netwalker::job::run_job(spec, transport, sink, events).await.unwrap();

    let reachability = result.reachability.expect("subnet mode always produces a matrix");
    assert_eq!(reachability.summary.total_scanned, 1);
    assert!(reachability.results.iter().all(|r| r.ip.to_string() != "10.0.0.2"));
}

#[tokio::test]
async fn bad_input_aborts_before_any_work() {
    let transport: Arc<dyn Transport> = Arc::new(FakeTransport::new());
    let sink = Arc::new(NullArtifactSink);
    let events = Arc::new(CapturingEventSink::new());

    let mut spec = base_spec(vec![Seed::parse("10.0.0.1").unwrap()], Mode::FullPipeline, "unused");
    spec.job_id = Some("not a valid id!".to_string());

    let outcome = netwalker::job::run_job(spec, transport, sink, events).await;
    assert!(outcome.is_err());
}
