//! Layered job-default settings (spec §6 numeric defaults; SPEC_FULL §2).
//!
//! A `#[serde(default)]` struct with a hand-written `Default` impl holding
//! the numeric defaults from spec §6, overridable first by an optional
//! YAML file and then by environment variables.

use serde::{Deserialize, Serialize};

/// Defaults applied to a [`crate::model::JobSpec`] when the operator omits
/// a field (spec §6). Submitted jobs still win over these on a
/// per-field basis — callers fill gaps with `JobDefaults`, they don't
/// overwrite explicit operator choices.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JobDefaults {
    pub timeout_secs: u64,
    pub concurrent_connections: usize,
    pub probe_ports: Vec<u16>,
    pub probe_concurrency: usize,
    pub max_depth: u32,
    pub discovery_protocols: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

impl Default for JobDefaults {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            concurrent_connections: 10,
            probe_ports: vec![22, 443],
            probe_concurrency: 200,
            max_depth: 3,
            discovery_protocols: vec!["cdp".to_string(), "lldp".to_string()],
            exclude_patterns: Vec::new(),
        }
    }
}

impl JobDefaults {
    /// Merges a parsed `discovery.yml` document's top-level keys over the
    /// current values, leaving anything the document omits untouched.
    pub fn apply_overrides(&mut self, overrides: &serde_yaml::Value) -> crate::error::Result<()> {
        if let Some(v) = overrides.get("timeout_secs").and_then(|v| v.as_u64()) {
            self.timeout_secs = v;
        }
        if let Some(v) = overrides.get("concurrent_connections").and_then(|v| v.as_u64()) {
            self.concurrent_connections = v as usize;
        }
        if let Some(v) = overrides.get("probe_concurrency").and_then(|v| v.as_u64()) {
            self.probe_concurrency = v as usize;
        }
        if let Some(v) = overrides.get("max_depth").and_then(|v| v.as_u64()) {
            self.max_depth = v as u32;
        }
        if let Some(v) = overrides.get("probe_ports") {
            if let Ok(ports) = serde_yaml::from_value::<Vec<u16>>(v.clone()) {
                self.probe_ports = ports;
            }
        }
        if let Some(v) = overrides.get("discovery_protocols") {
            if let Ok(protocols) = serde_yaml::from_value::<Vec<String>>(v.clone()) {
                self.discovery_protocols = protocols;
            }
        }
        if let Some(v) = overrides.get("exclude_patterns") {
            if let Ok(patterns) = serde_yaml::from_value::<Vec<String>>(v.clone()) {
                self.exclude_patterns = patterns;
            }
        }
        Ok(())
    }

    /// `NETWALKER_*` environment overrides, checked after the YAML layer.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("NETWALKER_TIMEOUT_SECS") {
            if let Ok(parsed) = v.parse() {
                self.timeout_secs = parsed;
            }
        }
        if let Ok(v) = std::env::var("NETWALKER_CONCURRENT_CONNECTIONS") {
            if let Ok(parsed) = v.parse() {
                self.concurrent_connections = parsed;
            }
        }
        if let Ok(v) = std::env::var("NETWALKER_PROBE_CONCURRENCY") {
            if let Ok(parsed) = v.parse() {
                self.probe_concurrency = parsed;
            }
        }
        if let Ok(v) = std::env::var("NETWALKER_MAX_DEPTH") {
            if let Ok(parsed) = v.parse() {
                self.max_depth = parsed;
            }
        }
        if let Ok(v) = std::env::var("NETWALKER_PROBE_PORTS") {
            self.probe_ports = v.split(',').filter_map(|p| p.trim().parse().ok()).collect();
        }
    }
}
