//! Unit tests for the data model: seed parsing, edge symmetry, and
//! credential redaction (spec properties 1, 5, 8).

use netwalker::model::{AuthType, Credential, Edge, JobResult, JobSpec, JobStatus, Mode, Seed};
use pretty_assertions::assert_eq;

#[test]
fn seed_round_trip_preserves_non_default_port() {
    let seed = Seed::parse("switch1.example.com:2200").unwrap();
    assert_eq!(seed.to_string(), "switch1.example.com:2200");
    assert_eq!(seed.port(), 2200);
}

#[test]
fn seed_subnet_round_trip() {
    let seed = Seed::parse("192.168.10.0/24").unwrap();
    assert_eq!(seed.to_string(), "192.168.10.0/24");
}

#[test]
fn seed_rejects_malformed_input() {
    // A bare hostname-looking string is accepted as a SingleHost; only
    // empty input and malformed ports/prefixes are rejected (spec §4.1).
    assert!(Seed::parse("").is_err());
    assert!(Seed::parse("10.0.0.1/300").is_err());
    assert!(Seed::parse("not-a-seed.example.com").is_ok());
}

#[test]
fn edge_symmetry_holds_regardless_of_direction() {
    let forward = Edge::new("core1", "core2", Some("Gi0/1".into()), Some("Gi0/2".into()));
    let reverse = Edge::new("core2", "core1", Some("Gi0/2".into()), Some("Gi0/1".into()));
    assert!(forward.matches_undirected(&reverse));
    assert!(reverse.matches_undirected(&forward));
}

#[test]
fn edge_with_different_ports_is_distinct() {
    let a = Edge::new("core1", "core2", Some("Gi0/1".into()), Some("Gi0/2".into()));
    let b = Edge::new("core2", "core1", Some("Gi0/3".into()), Some("Gi0/1".into()));
    assert!(!a.matches_undirected(&b));
}

#[test]
fn job_result_finalize_counts_by_status() {
    use netwalker::model::DiscoveryStatus;
    use std::net::IpAddr;

    let mut result = JobResult::new("job-1");
    let mut discovered = netwalker::model::Device::pending("10.0.0.1".parse::<IpAddr>().unwrap());
    discovered.discovery_status = DiscoveryStatus::Discovered;
    let mut failed = netwalker::model::Device::pending("10.0.0.2".parse::<IpAddr>().unwrap());
    failed.discovery_status = DiscoveryStatus::Failed;

    result.devices.insert(discovered.identity.clone(), discovered);
    result.devices.insert(failed.identity.clone(), failed);
    result.finalize(JobStatus::Completed);

    assert_eq!(result.counters.total, 2);
    assert_eq!(result.counters.discovered, 1);
    assert_eq!(result.counters.failed, 1);
    assert_eq!(result.status, JobStatus::Completed);
}

#[test]
fn job_spec_validation_rejects_unparsable_exclude_pattern() {
    let spec = JobSpec {
        seed_devices: vec![Seed::parse("10.0.0.1").unwrap()],
        credentials: vec![Credential {
            username: "admin".into(),
            password: "admin".into(),
            enable_secret: None,
            auth_type: AuthType::Password,
        }],
        mode: Mode::FullPipeline,
        max_depth: 3,
        discovery_protocols: vec![],
        timeout: std::time::Duration::from_secs(5),
        concurrent_connections: 1,
        exclude_patterns: vec![],
        probe_ports: vec![22],
        probe_concurrency: 4,
        job_id: Some("abc-123".into()),
    };
    assert!(JobSpec::validate_job_id(spec.job_id.as_ref().unwrap()).is_ok());
}

#[test]
fn credential_used_never_carries_the_password() {
    let cred = Credential {
        username: "netops".into(),
        password: "correct-horse-battery-staple".into(),
        enable_secret: Some("enable123".into()),
        auth_type: AuthType::Password,
    };
    let used = cred.redact(22);
    let rendered = serde_json::to_string(&used).unwrap();
    assert!(!rendered.contains("correct-horse-battery-staple"));
    assert!(!rendered.contains("enable123"));
    assert!(rendered.contains("netops"));

    // The Debug impl is the other boundary a stray `{:?}` log line would
    // cross (spec property 8).
    let debugged = format!("{cred:?}");
    assert!(!debugged.contains("correct-horse-battery-staple"));
    assert!(!debugged.contains("enable123"));
}
