//! `show version` (or family equivalent) parsing (spec §4.5).
//!
//! Family-specific regexes; every field is optional and a miss is silent.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::FamilyTag;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionInfo {
    pub platform: Option<String>,
    pub os_version: Option<String>,
    pub model: Option<String>,
    pub serial: Option<String>,
}

struct Patterns {
    os_version: Regex,
    model: Regex,
    serial: Regex,
}

fn ios_patterns() -> &'static Patterns {
    static P: OnceLock<Patterns> = OnceLock::new();
    P.get_or_init(|| Patterns {
        os_version: Regex::new(r"(?i)Version\s+([\w.\(\)]+)").unwrap(),
        model: Regex::new(r"(?i)cisco\s+(\S+)\s+\(").unwrap(),
        serial: Regex::new(r"(?i)Processor board ID\s+(\S+)").unwrap(),
    })
}

fn nxos_patterns() -> &'static Patterns {
    static P: OnceLock<Patterns> = OnceLock::new();
    P.get_or_init(|| Patterns {
        os_version: Regex::new(r"(?i)NXOS:\s*version\s+([\w.\(\)]+)").unwrap(),
        model: Regex::new(r"(?i)cisco\s+(Nexus\S*|N\dK-\S+)").unwrap(),
        serial: Regex::new(r"(?i)Processor Board ID\s+(\S+)").unwrap(),
    })
}

fn eos_patterns() -> &'static Patterns {
    static P: OnceLock<Patterns> = OnceLock::new();
    P.get_or_init(|| Patterns {
        os_version: Regex::new(r"(?i)Software image version:\s*([\w.\(\)]+)").unwrap(),
        model: Regex::new(r"(?i)Arista\s+(\S+)").unwrap(),
        serial: Regex::new(r"(?i)Serial number:\s*(\S+)").unwrap(),
    })
}

fn junos_patterns() -> &'static Patterns {
    static P: OnceLock<Patterns> = OnceLock::new();
    P.get_or_init(|| Patterns {
        os_version: Regex::new(r"(?i)Junos:\s*([\w.\-R]+)").unwrap(),
        model: Regex::new(r"(?i)Model:\s*(\S+)").unwrap(),
        serial: Regex::new(r"(?i)Chassis\s+(\S+)").unwrap(),
    })
}

fn patterns_for(family: FamilyTag) -> &'static Patterns {
    match family {
        FamilyTag::GenericIos | FamilyTag::IosXe => ios_patterns(),
        FamilyTag::Nxos => nxos_patterns(),
        FamilyTag::Eos => eos_patterns(),
        FamilyTag::Junos => junos_patterns(),
    }
}

/// Extracts whatever version fields the text yields; an empty `VersionInfo`
/// (all `None`) is a valid, non-error result.
pub fn parse(output: &str, family: FamilyTag) -> VersionInfo {
    let patterns = patterns_for(family);
    let platform = family_platform_label(output, family);
    VersionInfo {
        platform,
        os_version: capture(&patterns.os_version, output),
        model: capture(&patterns.model, output),
        serial: capture(&patterns.serial, output),
    }
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str().trim().to_string())
}

/// The platform line is whatever banner text the device prints first; we
/// don't try to validate it against `family` since vendors don't agree on
/// phrasing.
fn family_platform_label(output: &str, _family: FamilyTag) -> Option<String> {
    output.lines().find(|l| !l.trim().is_empty()).map(|l| l.trim().to_string())
}
