//! Reachability prober (spec §4.6, component F).
//!
//! Expands subnets into individual hosts, probes ICMP liveness per batch,
//! then fans out TCP port probes per member — all sharing one global
//! semaphore so a large subnet scan never starves the neighbor walk
//! running alongside it (spec §5).

use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use ipnetwork::IpNetwork;
use regex::Regex;
use tokio::sync::Semaphore;

use crate::model::{ReachabilityMatrix, ReachabilityRecord, ReachabilitySummary};
use crate::ports::{serialize_for_artifact, ArtifactSink};

const CHUNK_SIZE: usize = 256;

/// Expands `subnets` into individual host addresses, excluding the network
/// and broadcast addresses of IPv4 ranges wider than `/31` (spec §4.6).
pub fn enumerate_hosts(subnets: &[IpNetwork]) -> Vec<IpAddr> {
    let mut hosts = Vec::new();
    for net in subnets {
        match net {
            IpNetwork::V4(v4) => {
                if v4.prefix() >= 31 {
                    hosts.extend(v4.iter().map(IpAddr::V4));
                } else {
                    let network = v4.network();
                    let broadcast = v4.broadcast();
                    hosts.extend(v4.iter().filter(|ip| *ip != network && *ip != broadcast).map(IpAddr::V4));
                }
            }
            IpNetwork::V6(v6) => {
                hosts.extend(v6.iter().take(CHUNK_SIZE).map(IpAddr::V6));
            }
        }
    }
    hosts
}

/// Runs the full reachability pass over `subnets` against `probe_ports`,
/// bounded by `concurrency`, and returns the assembled matrix. Also writes
/// `reachability_matrix.json` to `sink` under `job_id` (spec §4.6, §6).
///
/// `exclude` addresses are dropped from the scan entirely — they are never
/// ICMP- or TCP-probed and never appear in the result (spec §4.1: a match
/// skips the address "both in reachability and in neighbor fan-out").
#[allow(clippy::too_many_arguments)]
pub async fn run(
    job_id: &str,
    subnets: &[IpNetwork],
    probe_ports: &[u16],
    concurrency: Arc<Semaphore>,
    probe_timeout: Duration,
    sink: &dyn ArtifactSink,
    exclude: &[Regex],
) -> crate::error::Result<ReachabilityMatrix> {
    let start = Instant::now();
    let hosts: Vec<IpAddr> = enumerate_hosts(subnets)
        .into_iter()
        .filter(|ip| !exclude.iter().any(|re| re.is_match(&ip.to_string())))
        .collect();

    let mut results = Vec::with_capacity(hosts.len());
    for chunk in hosts.chunks(CHUNK_SIZE) {
        let reachable = crate::probe::icmp::scan(chunk, probe_timeout, concurrency.clone()).await;
        let reachable_set: std::collections::HashSet<IpAddr> = reachable.into_iter().collect();

        let mut tasks = Vec::new();
        for &ip in chunk {
            for &port in probe_ports {
                let permit = concurrency.clone();
                tasks.push(tokio::spawn(async move {
                    let _permit = permit.acquire_owned().await.ok();
                    (ip, port, crate::probe::tcp::probe(ip, port, Duration::from_secs(2)).await)
                }));
            }
        }
        let mut open_by_ip: std::collections::HashMap<IpAddr, Vec<u16>> = std::collections::HashMap::new();
        for task in tasks {
            if let Ok((ip, port, state)) = task.await {
                if state == crate::probe::PortState::Open {
                    open_by_ip.entry(ip).or_default().push(port);
                }
            }
        }

        for &ip in chunk {
            let mut open_ports = open_by_ip.remove(&ip).unwrap_or_default();
            open_ports.sort_unstable();
            results.push(ReachabilityRecord {
                ip,
                icmp_reachable: reachable_set.contains(&ip),
                open_ports,
            });
        }
    }

    let summary = summarize(&results, probe_ports);
    let matrix = ReachabilityMatrix {
        results,
        summary,
        duration_sec: start.elapsed().as_secs_f64(),
        timestamp: Utc::now(),
    };

    let bytes = serialize_for_artifact(&matrix)?;
    if let Err(err) = sink.write(job_id, "reachability_matrix.json", &bytes).await {
        tracing::warn!(job_id, error = %err, "failed to write reachability_matrix.json");
    }

    Ok(matrix)
}

fn summarize(results: &[ReachabilityRecord], probe_ports: &[u16]) -> ReachabilitySummary {
    let mut port_counts = std::collections::BTreeMap::new();
    for &port in probe_ports {
        port_counts.insert(format!("port_{port}_open"), 0usize);
    }
    let mut icmp_reachable = 0;
    for record in results {
        if record.icmp_reachable {
            icmp_reachable += 1;
        }
        for &port in &record.open_ports {
            *port_counts.entry(format!("port_{port}_open")).or_insert(0) += 1;
        }
    }
    ReachabilitySummary {
        total_scanned: results.len(),
        icmp_reachable,
        port_counts,
    }
}
