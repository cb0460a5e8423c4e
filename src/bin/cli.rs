//! netwalker-cli: ad-hoc command-line submission of a single discovery job.
//!
//! A thin demonstration binary: it builds a [`netwalker::model::JobSpec`]
//! from flags, runs it through
//! [`netwalker::job::run_job`] with the crate's default in-memory/tracing
//! ports, and prints the resulting counters. Production deployments wire
//! the same `run_job` entry point behind their own HTTP API (spec §1, §6 —
//! out of scope here).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use netwalker::model::{AuthType, Credential, DiscoveryProtocol, JobSpec, Mode, Seed};
use netwalker::ports::{FsArtifactSink, TracingEventSink};
use netwalker::transport::ssh::SshTransport;

#[derive(Parser)]
#[command(name = "netwalker-cli", about = "Submit a network discovery job")]
struct Cli {
    /// Seed addresses: `HOST`, `HOST:PORT`, or `A.B.C.D/P`.
    #[arg(required = true)]
    seeds: Vec<String>,

    /// Discovery mode.
    #[arg(short, long, value_enum, default_value = "full-pipeline")]
    mode: CliMode,

    /// SSH username tried against every seed.
    #[arg(short, long, default_value = "admin")]
    username: String,

    /// SSH password tried against every seed. Prefer an environment
    /// variable over a shell history entry in real use.
    #[arg(short, long, env = "NETWALKER_PASSWORD", default_value = "")]
    password: String,

    /// Breadth-first hop bound for full-pipeline/seed-device modes.
    #[arg(long, default_value_t = 3)]
    max_depth: u32,

    /// Directory artifacts are written under (one subdirectory per job_id).
    #[arg(long, default_value = "./netwalker-artifacts")]
    artifact_dir: PathBuf,

    /// Per-device timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Enable debug logging.
    #[arg(short = 'D', long)]
    debug: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum CliMode {
    Subnet,
    SeedDevice,
    FullPipeline,
}

impl From<CliMode> for Mode {
    fn from(m: CliMode) -> Self {
        match m {
            CliMode::Subnet => Mode::Subnet,
            CliMode::SeedDevice => Mode::SeedDevice,
            CliMode::FullPipeline => Mode::FullPipeline,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(filter.parse()?))
        .init();

    let defaults = netwalker::config::load_config(None).unwrap_or_default();

    let seeds = cli
        .seeds
        .iter()
        .map(|s| Seed::parse(s))
        .collect::<Result<Vec<_>, _>>()?;

    let spec = JobSpec {
        seed_devices: seeds,
        credentials: vec![Credential {
            username: cli.username,
            password: cli.password,
            enable_secret: None,
            auth_type: AuthType::Password,
        }],
        mode: cli.mode.into(),
        max_depth: cli.max_depth,
        discovery_protocols: vec![DiscoveryProtocol::Cdp, DiscoveryProtocol::Lldp],
        timeout: Duration::from_secs(cli.timeout_secs),
        concurrent_connections: defaults.concurrent_connections,
        exclude_patterns: Vec::new(),
        probe_ports: defaults.probe_ports,
        probe_concurrency: defaults.probe_concurrency,
        job_id: None,
    };

    let transport = Arc::new(SshTransport::new());
    let sink = Arc::new(FsArtifactSink::new(cli.artifact_dir));
    let events = Arc::new(TracingEventSink);

    let result = netwalker::job::run_job(spec, transport, sink, events).await?;

    println!("job {} finished: {:?}", result.job_id, result.status);
    println!(
        "  devices: {} total, {} discovered, {} failed",
        result.counters.total, result.counters.discovered, result.counters.failed
    );
    println!("  edges: {}", result.edges.len());
    if let Some(reachability) = &result.reachability {
        println!(
            "  reachability: {} scanned, {} icmp_reachable",
            reachability.summary.total_scanned, reachability.summary.icmp_reachable
        );
    }

    Ok(())
}
