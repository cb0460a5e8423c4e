//! External collaborator ports (spec §1, §6).
//!
//! The core never embeds an HTTP server, a log backend, or an exporter —
//! it calls through these three traits instead, injected into workers
//! rather than constructed by them. Default in-memory/tracing
//! implementations are provided so the core is runnable standalone;
//! production deployments supply their own.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::model::Credential;

/// Supplies credential material to the walk/introspection engines.
///
/// In the simplest deployment this just returns the job-submitted list
/// unchanged; the trait exists so a vault-backed or LDAP-backed source can
/// be substituted without the core depending on either.
pub trait CredentialSource: Send + Sync {
    fn credentials(&self) -> Vec<Credential>;
}

/// A `CredentialSource` that returns exactly the list the job was submitted with.
pub struct InMemoryCredentialSource {
    credentials: Vec<Credential>,
}

impl InMemoryCredentialSource {
    pub fn new(credentials: Vec<Credential>) -> Self {
        Self { credentials }
    }
}

impl CredentialSource for InMemoryCredentialSource {
    fn credentials(&self) -> Vec<Credential> {
        self.credentials.clone()
    }
}

/// Persists named artifacts for a job. Must be idempotent; on failure the
/// core logs and proceeds (spec §6).
#[async_trait::async_trait]
pub trait ArtifactSink: Send + Sync {
    async fn write(&self, job_id: &str, name: &str, bytes: &[u8]) -> Result<()>;
}

/// Discards everything. Useful for tests and for jobs that only need the
/// in-memory `JobResult`.
pub struct NullArtifactSink;

#[async_trait::async_trait]
impl ArtifactSink for NullArtifactSink {
    async fn write(&self, _job_id: &str, _name: &str, _bytes: &[u8]) -> Result<()> {
        Ok(())
    }
}

/// Writes artifacts to `<root>/<job_id>/<name>` on the local filesystem.
pub struct FsArtifactSink {
    root: PathBuf,
}

impl FsArtifactSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait::async_trait]
impl ArtifactSink for FsArtifactSink {
    async fn write(&self, job_id: &str, name: &str, bytes: &[u8]) -> Result<()> {
        let dir = self.root.join(job_id);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(name), bytes).await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

/// Structured-event sink: `emit(level, fields)` (spec §1, §6).
pub trait EventSink: Send + Sync {
    fn emit(&self, level: Level, fields: serde_json::Value);
}

/// Forwards events to `tracing`, the way the rest of this crate logs.
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, level: Level, fields: serde_json::Value) {
        match level {
            Level::Debug => tracing::debug!(event = %fields, "discovery event"),
            Level::Info => tracing::info!(event = %fields, "discovery event"),
            Level::Warn => tracing::warn!(event = %fields, "discovery event"),
            Level::Error => tracing::error!(event = %fields, "discovery event"),
        }
    }
}

/// Captures events in memory. Used by tests that assert on emitted events
/// (e.g. property 8 — no plaintext secret ever reaches the sink).
#[derive(Default)]
pub struct CapturingEventSink {
    events: Arc<Mutex<Vec<(Level, serde_json::Value)>>>,
}

impl CapturingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<(Level, serde_json::Value)> {
        self.events.lock().await.clone()
    }
}

impl EventSink for CapturingEventSink {
    fn emit(&self, level: Level, fields: serde_json::Value) {
        let events = self.events.clone();
        // emit() is synchronous in the trait (matching tracing's macro
        // call sites); stash onto the async-aware buffer via try_lock since
        // contention here is negligible in test usage.
        if let Ok(mut guard) = events.try_lock() {
            guard.push((level, fields));
        }
    }
}

pub fn serialize_for_artifact<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(value).map_err(|e| crate::error::Error::Internal(e.to_string()))
}

