//! Job submission, registry, and result model (spec §3, §6, §4.10).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::address::Seed;
use crate::model::credential::Credential;
use crate::model::device::Device;
use crate::model::edge::Edge;
use crate::model::reachability::ReachabilityMatrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    Subnet,
    SeedDevice,
    FullPipeline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryProtocol {
    Cdp,
    Lldp,
}

/// Operator-submitted job specification (spec §6 — the HTTP shape is external,
/// this is the contract the core accepts).
#[derive(Debug, Clone)]
pub struct JobSpec {
    pub seed_devices: Vec<Seed>,
    pub credentials: Vec<Credential>,
    pub mode: Mode,
    pub max_depth: u32,
    pub discovery_protocols: Vec<DiscoveryProtocol>,
    pub timeout: std::time::Duration,
    pub concurrent_connections: usize,
    pub exclude_patterns: Vec<String>,
    pub probe_ports: Vec<u16>,
    pub probe_concurrency: usize,
    pub job_id: Option<String>,
}

impl JobSpec {
    /// Validates the job_id shape (spec §6: `^[A-Za-z0-9_-]+$`).
    pub fn validate_job_id(job_id: &str) -> crate::error::Result<()> {
        let valid = !job_id.is_empty()
            && job_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if valid {
            Ok(())
        } else {
            Err(crate::error::Error::BadInput(format!(
                "job_id '{job_id}' does not match ^[A-Za-z0-9_-]+$"
            )))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobCounters {
    pub total: usize,
    pub discovered: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    pub job_id: String,
    pub devices: HashMap<String, Device>,
    pub adjacency: HashMap<String, Vec<String>>,
    pub edges: Vec<Edge>,
    pub reachability: Option<ReachabilityMatrix>,
    pub counters: JobCounters,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: JobStatus,
}

impl JobResult {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            devices: HashMap::new(),
            adjacency: HashMap::new(),
            edges: Vec::new(),
            reachability: None,
            counters: JobCounters::default(),
            start_time: Utc::now(),
            end_time: None,
            status: JobStatus::Running,
        }
    }

    pub fn finalize(&mut self, status: JobStatus) {
        self.counters.total = self.devices.len();
        self.counters.discovered = self
            .devices
            .values()
            .filter(|d| d.discovery_status == crate::model::device::DiscoveryStatus::Discovered)
            .count();
        self.counters.failed = self
            .devices
            .values()
            .filter(|d| {
                matches!(
                    d.discovery_status,
                    crate::model::device::DiscoveryStatus::Failed
                        | crate::model::device::DiscoveryStatus::Unreachable
                )
            })
            .count();
        self.end_time = Some(Utc::now());
        self.status = status;
    }
}
