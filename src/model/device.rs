//! Device, interface, and neighbor-claim records (spec §3).

use std::collections::HashSet;
use std::net::IpAddr;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::model::config::ParsedConfig;
use crate::model::credential::CredentialUsed;

/// Family tags recognized across the transport/dispatch/parser boundary (spec §4.3/§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FamilyTag {
    GenericIos,
    Nxos,
    Junos,
    Eos,
    IosXe,
}

impl FamilyTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            FamilyTag::GenericIos => "generic_ios",
            FamilyTag::Nxos => "nxos",
            FamilyTag::Junos => "junos",
            FamilyTag::Eos => "eos",
            FamilyTag::IosXe => "ios_xe",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryStatus {
    Pending,
    Running,
    Discovered,
    Failed,
    Unreachable,
}

fn error_echo_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Invalid input").unwrap())
}

/// Returns true when a hostname candidate looks like a command-error echo
/// (spec §3, §9 "Command-error echoes as data") rather than a real hostname.
pub fn looks_like_error_echo(candidate: &str) -> bool {
    let trimmed = candidate.trim_start();
    trimmed.starts_with('^') || error_echo_regex().is_match(candidate)
}

/// The canonical key for a discovered device: a trustworthy hostname, or the
/// primary IP otherwise (spec §3 DeviceId).
pub fn canonical_identity(hostname: Option<&str>, primary_ip: IpAddr) -> String {
    match hostname {
        Some(h) if !h.trim().is_empty() && !looks_like_error_echo(h) => h.trim().to_string(),
        _ => primary_ip.to_string(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interface {
    /// Verbatim as reported by the device.
    pub name: String,
    pub ip: Option<String>,
    pub mask: Option<String>,
    pub description: Option<String>,
    pub admin_status: AdminStatus,
    pub access_vlan: Option<u32>,
    pub trunk: bool,
    pub secondary_ips: Vec<(String, String)>,
    /// Populated by the topology builder: `"<neighbor hostname-or-ip>:<remote_if>"`.
    pub connected_to: Option<String>,
}

impl Interface {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ip: None,
            mask: None,
            description: None,
            admin_status: AdminStatus::Up,
            access_vlan: None,
            trunk: false,
            secondary_ips: Vec::new(),
            connected_to: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminStatus {
    Up,
    Down,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborClaim {
    pub hostname: String,
    pub ip: IpAddr,
    pub platform: Option<String>,
    pub local_interface: Option<String>,
    pub remote_interface: Option<String>,
    pub vlan: Option<u32>,
    pub capabilities: Option<String>,
    pub holdtime: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub primary_ip: IpAddr,
    pub identity: String,
    pub family: Option<FamilyTag>,
    pub platform: Option<String>,
    pub os_version: Option<String>,
    pub model: Option<String>,
    pub serial: Option<String>,
    pub all_ips: HashSet<IpAddr>,
    pub interfaces: Vec<Interface>,
    pub neighbor_claims: Vec<NeighborClaim>,
    pub raw_config: Option<String>,
    pub parsed_config: Option<ParsedConfig>,
    pub discovery_status: DiscoveryStatus,
    pub discovery_error: Option<String>,
    pub credentials_used: Option<CredentialUsed>,
}

impl Device {
    pub fn pending(primary_ip: IpAddr) -> Self {
        Self {
            primary_ip,
            identity: primary_ip.to_string(),
            family: None,
            platform: None,
            os_version: None,
            model: None,
            serial: None,
            all_ips: HashSet::from([primary_ip]),
            interfaces: Vec::new(),
            neighbor_claims: Vec::new(),
            raw_config: None,
            parsed_config: None,
            discovery_status: DiscoveryStatus::Pending,
            discovery_error: None,
            credentials_used: None,
        }
    }

    /// Find an interface by its verbatim name.
    pub fn interface_mut(&mut self, name: &str) -> Option<&mut Interface> {
        self.interfaces.iter_mut().find(|i| i.name == name)
    }
}
