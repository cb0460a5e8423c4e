//! Platform command dispatch (spec §4.4). Pure data: no I/O, no parsing.
//!
//! A flat match over a small fixed universe of keys rather than a generic
//! registry, since the key space here (five family tags, seven operations)
//! is small and static.

use crate::model::FamilyTag;

/// Logical operations the walk engine asks a device to perform. Unknown
/// operation names fall back to themselves as the literal command text
/// (spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Version,
    Config,
    Interfaces,
    Hostname,
    Inventory,
    CdpNeighbors,
    LldpNeighbors,
}

impl Operation {
    fn as_str(&self) -> &'static str {
        match self {
            Operation::Version => "version",
            Operation::Config => "config",
            Operation::Interfaces => "interfaces",
            Operation::Hostname => "hostname",
            Operation::Inventory => "inventory",
            Operation::CdpNeighbors => "cdp_neighbors",
            Operation::LldpNeighbors => "lldp_neighbors",
        }
    }
}

/// Returns the exact command text a device of `family` expects for
/// `operation`. Falls back to the `generic_ios` table when `family` has no
/// entry for the operation, and to the operation's own name when no family
/// has one at all (spec §4.4: "unknown operations fall back to the literal
/// operation name").
pub fn command_for(family: FamilyTag, operation: Operation) -> &'static str {
    if let Some(cmd) = lookup(family, operation) {
        return cmd;
    }
    if family != FamilyTag::GenericIos {
        if let Some(cmd) = lookup(FamilyTag::GenericIos, operation) {
            return cmd;
        }
    }
    operation.as_str()
}

fn lookup(family: FamilyTag, operation: Operation) -> Option<&'static str> {
    use FamilyTag::*;
    use Operation::*;
    match (family, operation) {
        (GenericIos, Version) => Some("show version"),
        (GenericIos, Config) => Some("show running-config"),
        (GenericIos, Interfaces) => Some("show ip interface brief"),
        (GenericIos, Hostname) => Some("show hostname"),
        (GenericIos, Inventory) => Some("show inventory"),
        (GenericIos, CdpNeighbors) => Some("show cdp neighbors detail"),
        (GenericIos, LldpNeighbors) => Some("show lldp neighbors detail"),

        (IosXe, Version) => Some("show version"),
        (IosXe, Config) => Some("show running-config"),
        (IosXe, Interfaces) => Some("show ip interface brief"),
        (IosXe, Hostname) => Some("show hostname"),
        (IosXe, Inventory) => Some("show inventory"),
        (IosXe, CdpNeighbors) => Some("show cdp neighbors detail"),
        (IosXe, LldpNeighbors) => Some("show lldp neighbors detail"),

        (Nxos, Version) => Some("show version"),
        (Nxos, Config) => Some("show running-config"),
        (Nxos, Interfaces) => Some("show ip interface brief"),
        (Nxos, Hostname) => Some("show hostname"),
        (Nxos, Inventory) => Some("show inventory"),
        (Nxos, CdpNeighbors) => Some("show cdp neighbors detail"),
        (Nxos, LldpNeighbors) => Some("show lldp neighbors detail"),

        (Eos, Version) => Some("show version"),
        (Eos, Config) => Some("show running-config"),
        (Eos, Interfaces) => Some("show ip interface brief"),
        (Eos, Hostname) => Some("show hostname"),
        (Eos, Inventory) => Some("show inventory"),
        (Eos, CdpNeighbors) => Some("show lldp neighbors detail"), // Arista speaks LLDP, not CDP
        (Eos, LldpNeighbors) => Some("show lldp neighbors detail"),

        (Junos, Version) => Some("show version"),
        (Junos, Config) => Some("show configuration | no-more"),
        (Junos, Interfaces) => Some("show interfaces terse"),
        (Junos, Hostname) => Some("show version | match Hostname"),
        (Junos, Inventory) => Some("show chassis hardware"),
        (Junos, CdpNeighbors) => None,
        (Junos, LldpNeighbors) => Some("show lldp neighbors"),
    }
}
