//! Hostname extraction (spec §4.5).

use std::sync::OnceLock;

use regex::Regex;

use crate::model::device::looks_like_error_echo;

fn config_hostname_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^hostname\s+(\S+)").unwrap())
}

fn juniper_hostname_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Hostname:\s+(\S+)").unwrap())
}

/// First `hostname <name>` line in a running-config wins (spec §4.5).
pub fn from_config(config: &str) -> Option<String> {
    config_hostname_regex()
        .captures(config)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// The output of `show hostname` (or Juniper's `Hostname: X` line). Trimmed
/// output that looks like a command-error echo yields `None` rather than
/// being mistaken for a real hostname.
pub fn from_command_output(output: &str) -> Option<String> {
    if let Some(caps) = juniper_hostname_regex().captures(output) {
        return caps.get(1).map(|m| m.as_str().to_string());
    }
    let trimmed = output.trim();
    if trimmed.is_empty() || looks_like_error_echo(trimmed) {
        return None;
    }
    Some(trimmed.to_string())
}
