//! Job orchestrator (spec §4.10, component J).
//!
//! Routes a submitted [`JobSpec`] through one of three modes and finalizes
//! the [`JobResult`], writing the artifacts each mode produces through the
//! injected [`ArtifactSink`]. A flat match picking one of several entry
//! points, generalized to the three discovery modes in spec §4.10.

use std::sync::Arc;
use std::time::Duration;

use ipnetwork::IpNetwork;
use tokio::sync::Semaphore;

use crate::error::{Error, Result};
use crate::model::{JobResult, JobSpec, JobStatus, Mode, Seed};
use crate::ports::{ArtifactSink, EventSink, Level};
use crate::transport::Transport;

/// Validates the job spec at submit time; `BadInput` here aborts before any
/// work starts (spec §4.1, §7).
fn validate(spec: &JobSpec) -> Result<()> {
    if let Some(job_id) = &spec.job_id {
        JobSpec::validate_job_id(job_id)?;
    }
    if spec.seed_devices.is_empty() {
        return Err(Error::BadInput("job has no seed_devices".into()));
    }
    for pattern in &spec.exclude_patterns {
        regex::Regex::new(pattern)?;
    }
    Ok(())
}

/// Runs a discovery job end to end (spec §4.10). The overall deadline is
/// `max(timeout*3, 180s)` (spec §5).
pub async fn run_job(
    spec: JobSpec,
    transport: Arc<dyn Transport>,
    sink: Arc<dyn ArtifactSink>,
    events: Arc<dyn EventSink>,
) -> Result<JobResult> {
    validate(&spec)?;

    let job_id = spec.job_id.clone().unwrap_or_else(default_job_id);
    let mut result = JobResult::new(job_id.clone());

    events.emit(
        Level::Info,
        serde_json::json!({"event": "job_started", "job_id": job_id, "mode": mode_label(spec.mode)}),
    );

    let overall_deadline = spec.timeout.saturating_mul(3).max(Duration::from_secs(180));
    let outcome = tokio::time::timeout(overall_deadline, dispatch(&spec, &job_id, transport.clone(), sink.as_ref()))
        .await;

    match outcome {
        Ok(Ok(dispatched)) => {
            result.devices = dispatched.devices;
            result.adjacency = dispatched.adjacency;
            result.edges = dispatched.edges;
            result.reachability = dispatched.reachability;
            result.finalize(JobStatus::Completed);
        }
        Ok(Err(err)) => {
            events.emit(Level::Error, serde_json::json!({"event": "job_failed", "job_id": job_id, "error": err.to_string()}));
            result.finalize(JobStatus::Failed);
        }
        Err(_elapsed) => {
            events.emit(Level::Warn, serde_json::json!({"event": "job_deadline_exceeded", "job_id": job_id}));
            result.finalize(JobStatus::Completed);
        }
    }

    events.emit(
        Level::Info,
        serde_json::json!({
            "event": "job_finished",
            "job_id": job_id,
            "total": result.counters.total,
            "discovered": result.counters.discovered,
            "failed": result.counters.failed,
        }),
    );

    Ok(result)
}

fn mode_label(mode: Mode) -> &'static str {
    match mode {
        Mode::Subnet => "subnet",
        Mode::SeedDevice => "seed-device",
        Mode::FullPipeline => "full-pipeline",
    }
}

fn default_job_id() -> String {
    format!("job-{}", uuid::Uuid::new_v4())
}

struct Dispatched {
    devices: std::collections::HashMap<String, crate::model::Device>,
    adjacency: std::collections::HashMap<String, Vec<String>>,
    edges: Vec<crate::model::Edge>,
    reachability: Option<crate::model::ReachabilityMatrix>,
}

async fn dispatch(
    spec: &JobSpec,
    job_id: &str,
    transport: Arc<dyn Transport>,
    sink: &dyn ArtifactSink,
) -> Result<Dispatched> {
    let probe_concurrency = Arc::new(Semaphore::new(spec.probe_concurrency));
    let exclude = spec
        .exclude_patterns
        .iter()
        .map(|p| regex::Regex::new(p))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    match spec.mode {
        Mode::Subnet => {
            let subnets = subnets_from_seeds(&spec.seed_devices)?;
            let matrix = crate::prober::run(
                job_id,
                &subnets,
                &spec.probe_ports,
                probe_concurrency,
                Duration::from_secs(2),
                sink,
                &exclude,
            )
            .await?;
            Ok(Dispatched {
                devices: std::collections::HashMap::new(),
                adjacency: std::collections::HashMap::new(),
                edges: Vec::new(),
                reachability: Some(matrix),
            })
        }
        Mode::SeedDevice => {
            let identity = crate::identity::IdentityTable::new();
            let introspection = crate::introspect::run(
                &spec.seed_devices,
                &spec.credentials,
                transport.as_ref(),
                spec.timeout,
                &identity,
            )
            .await;

            let mut devices = introspection.devices;
            let reachability = if introspection.subnets.is_empty() {
                None
            } else {
                Some(
                    crate::prober::run(
                        job_id,
                        &introspection.subnets,
                        &spec.probe_ports,
                        probe_concurrency,
                        Duration::from_secs(2),
                        sink,
                        &exclude,
                    )
                    .await?,
                )
            };

            // Seeds that introspection couldn't log into still get a walk
            // pass over themselves, plus every host the reachability pass
            // found alive (spec §4.10 "union of seeds and F's hits").
            let mut walk_seeds: Vec<Seed> = spec.seed_devices.clone();
            if let Some(matrix) = &reachability {
                for record in &matrix.results {
                    if record.icmp_reachable || !record.open_ports.is_empty() {
                        walk_seeds.push(Seed::SingleHost { address: record.ip.to_string(), port: None });
                    }
                }
            }

            let walked = crate::walk::run(
                &walk_seeds,
                spec.credentials.clone(),
                &spec.exclude_patterns,
                spec.discovery_protocols.clone(),
                spec.max_depth,
                spec.timeout,
                spec.timeout.saturating_mul(3).max(Duration::from_secs(180)),
                spec.concurrent_connections,
                transport,
            )
            .await?;
            devices.extend(walked);

            let identity = crate::identity::IdentityTable::new();
            for (id, device) in &devices {
                identity.register(id, device.primary_ip);
                for ip in &device.all_ips {
                    identity.register(id, *ip);
                }
            }
            let (adjacency, edges) = crate::topology::build(&mut devices, &identity);

            Ok(Dispatched { devices, adjacency, edges, reachability })
        }
        Mode::FullPipeline => {
            let devices = crate::walk::run(
                &spec.seed_devices,
                spec.credentials.clone(),
                &spec.exclude_patterns,
                spec.discovery_protocols.clone(),
                spec.max_depth,
                spec.timeout,
                spec.timeout.saturating_mul(3).max(Duration::from_secs(180)),
                spec.concurrent_connections,
                transport,
            )
            .await?;

            let identity = crate::identity::IdentityTable::new();
            let mut devices = devices;
            for (id, device) in &devices {
                identity.register(id, device.primary_ip);
                for ip in &device.all_ips {
                    identity.register(id, *ip);
                }
            }
            let (adjacency, edges) = crate::topology::build(&mut devices, &identity);

            Ok(Dispatched { devices, adjacency, edges, reachability: None })
        }
    }
}

fn subnets_from_seeds(seeds: &[Seed]) -> Result<Vec<IpNetwork>> {
    let mut subnets = Vec::new();
    for seed in seeds {
        match seed {
            Seed::Subnet(net) => subnets.push(*net),
            Seed::SingleHost { address, .. } => {
                let ip: std::net::IpAddr =
                    address.parse().map_err(|_| Error::BadInput(format!("subnet mode requires CIDR seeds, got '{address}'")))?;
                subnets.push(IpNetwork::new(ip, if ip.is_ipv4() { 32 } else { 128 })?);
            }
        }
    }
    Ok(subnets)
}
