//! netwalker-backend: drains a directory of submitted job specs.
//!
//! A thin demonstration daemon. Since persistent storage beyond the
//! artifact sink is a Non-goal (spec §1), the "queue" here is just a
//! directory of `*.json` job submissions (spec §6's contract shape)
//! dropped by whatever external HTTP API a real deployment fronts this
//! with. Each file is parsed, run to completion through
//! [`netwalker::job::run_job`], and its result written back alongside the
//! job's artifacts.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use netwalker::model::{AuthType, Credential, DiscoveryProtocol, JobSpec, Mode, Seed};
use netwalker::ports::{ArtifactSink, EventSink, FsArtifactSink, TracingEventSink};
use netwalker::transport::ssh::SshTransport;
use netwalker::transport::Transport;

#[derive(Parser)]
#[command(name = "netwalker-backend", about = "Drains submitted discovery jobs from a directory")]
struct Cli {
    /// Directory scanned for `*.json` job submissions.
    #[arg(long, default_value = "./netwalker-queue")]
    queue_dir: PathBuf,

    /// Directory artifacts and job results are written under.
    #[arg(long, default_value = "./netwalker-artifacts")]
    artifact_dir: PathBuf,

    /// Poll interval between queue scans, in milliseconds.
    #[arg(long, default_value_t = 2000)]
    poll_ms: u64,
}

/// The wire shape of a job submission (spec §6), deserialized from a queue
/// file and converted into a `JobSpec`.
#[derive(Deserialize)]
struct JobSubmission {
    seed_devices: Vec<String>,
    credentials: Vec<CredentialSubmission>,
    #[serde(default = "default_mode")]
    mode: String,
    #[serde(default = "default_max_depth")]
    max_depth: u32,
    #[serde(default = "default_protocols")]
    discovery_protocols: Vec<String>,
    #[serde(default = "default_timeout")]
    timeout_secs: u64,
    #[serde(default = "default_concurrency")]
    concurrent_connections: usize,
    #[serde(default)]
    exclude_patterns: Vec<String>,
    #[serde(default = "default_probe_ports")]
    probe_ports: Vec<u16>,
    #[serde(default = "default_probe_concurrency")]
    probe_concurrency: usize,
    job_id: Option<String>,
}

#[derive(Deserialize)]
struct CredentialSubmission {
    username: String,
    password: String,
    enable_secret: Option<String>,
    #[serde(default = "default_auth_type")]
    auth_type: String,
}

fn default_mode() -> String {
    "full-pipeline".to_string()
}
fn default_max_depth() -> u32 {
    3
}
fn default_protocols() -> Vec<String> {
    vec!["cdp".to_string(), "lldp".to_string()]
}
fn default_timeout() -> u64 {
    30
}
fn default_concurrency() -> usize {
    10
}
fn default_probe_ports() -> Vec<u16> {
    vec![22, 443]
}
fn default_probe_concurrency() -> usize {
    200
}
fn default_auth_type() -> String {
    "password".to_string()
}

impl JobSubmission {
    fn into_job_spec(self) -> Result<JobSpec> {
        let seed_devices = self
            .seed_devices
            .iter()
            .map(|s| Seed::parse(s))
            .collect::<netwalker::Result<Vec<_>>>()?;

        let credentials = self
            .credentials
            .into_iter()
            .map(|c| {
                let auth_type = match c.auth_type.as_str() {
                    "key" => AuthType::Key,
                    "token" => AuthType::Token,
                    _ => AuthType::Password,
                };
                Credential { username: c.username, password: c.password, enable_secret: c.enable_secret, auth_type }
            })
            .collect();

        let mode = match self.mode.as_str() {
            "subnet" => Mode::Subnet,
            "seed-device" => Mode::SeedDevice,
            _ => Mode::FullPipeline,
        };

        let discovery_protocols = self
            .discovery_protocols
            .iter()
            .filter_map(|p| match p.as_str() {
                "cdp" => Some(DiscoveryProtocol::Cdp),
                "lldp" => Some(DiscoveryProtocol::Lldp),
                _ => None,
            })
            .collect();

        Ok(JobSpec {
            seed_devices,
            credentials,
            mode,
            max_depth: self.max_depth,
            discovery_protocols,
            timeout: Duration::from_secs(self.timeout_secs),
            concurrent_connections: self.concurrent_connections,
            exclude_patterns: self.exclude_patterns,
            probe_ports: self.probe_ports,
            probe_concurrency: self.probe_concurrency,
            job_id: self.job_id,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();
    std::fs::create_dir_all(&cli.queue_dir).context("failed to create queue directory")?;
    tracing::info!("netwalker {} backend starting, watching {}", netwalker::VERSION, cli.queue_dir.display());

    let transport: Arc<dyn Transport> = Arc::new(SshTransport::new());
    let sink: Arc<dyn ArtifactSink> = Arc::new(FsArtifactSink::new(cli.artifact_dir.clone()));
    let events: Arc<dyn EventSink> = Arc::new(TracingEventSink);

    loop {
        match drain_once(&cli.queue_dir, transport.clone(), sink.clone(), events.clone()).await {
            Ok(0) => {}
            Ok(n) => tracing::info!("processed {} job(s)", n),
            Err(e) => tracing::warn!("queue scan failed: {}", e),
        }
        tokio::time::sleep(Duration::from_millis(cli.poll_ms)).await;
    }
}

async fn drain_once(
    queue_dir: &PathBuf,
    transport: Arc<dyn Transport>,
    sink: Arc<dyn ArtifactSink>,
    events: Arc<dyn EventSink>,
) -> Result<usize> {
    let mut processed = 0;
    let mut entries = tokio::fs::read_dir(queue_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let contents = tokio::fs::read_to_string(&path).await?;
        let submission: JobSubmission = match serde_json::from_str(&contents) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("skipping malformed job file {}: {}", path.display(), e);
                let _ = tokio::fs::remove_file(&path).await;
                continue;
            }
        };
        let spec = submission.into_job_spec()?;
        let result = netwalker::job::run_job(spec, transport.clone(), sink.clone(), events.clone()).await?;
        tracing::info!(
            "job {} completed: {} discovered / {} total",
            result.job_id, result.counters.discovered, result.counters.total
        );
        let _ = tokio::fs::remove_file(&path).await;
        processed += 1;
    }
    Ok(processed)
}
