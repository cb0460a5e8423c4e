//! Seed address parsing: `HOST`, `HOST:PORT`, or `A.B.C.D/P`.

use std::fmt;
use std::net::IpAddr;

use ipnetwork::IpNetwork;

use crate::error::{Error, Result};

/// Default transport port assumed when a seed omits one.
pub const DEFAULT_PORT: u16 = 22;

/// An operator-supplied discovery starting point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Seed {
    SingleHost { address: String, port: Option<u16> },
    Subnet(IpNetwork),
}

impl Seed {
    /// Parse one of the three accepted shapes. Fails the job with `BadInput`
    /// on anything else (spec §4.1).
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Error::BadInput("empty seed".into()));
        }

        if let Some((host, rest)) = raw.split_once('/') {
            let prefix: u8 = rest
                .parse()
                .map_err(|_| Error::BadInput(format!("bad prefix in {raw}")))?;
            let ip: IpAddr = host
                .parse()
                .map_err(|_| Error::BadInput(format!("bad CIDR host in {raw}")))?;
            if prefix > 32 {
                return Err(Error::BadInput(format!("prefix out of range in {raw}")));
            }
            let net = IpNetwork::new(ip, prefix)?;
            return Ok(Seed::Subnet(net));
        }

        if let Some((host, port_str)) = raw.rsplit_once(':') {
            // Reject bracketed/IPv6-style input; this spec only recognizes dotted IPv4 hosts and names.
            if !host.is_empty() && !host.contains(':') {
                let port: u16 = port_str
                    .parse()
                    .map_err(|_| Error::BadInput(format!("bad port in {raw}")))?;
                if port == 0 {
                    return Err(Error::BadInput(format!("port out of range in {raw}")));
                }
                return Ok(Seed::SingleHost {
                    address: host.to_string(),
                    port: Some(port),
                });
            }
        }

        Ok(Seed::SingleHost {
            address: raw.to_string(),
            port: None,
        })
    }

    /// The port to use for this seed, defaulting to 22.
    pub fn port(&self) -> u16 {
        match self {
            Seed::SingleHost { port, .. } => port.unwrap_or(DEFAULT_PORT),
            Seed::Subnet(_) => DEFAULT_PORT,
        }
    }
}

impl fmt::Display for Seed {
    /// Render back to the canonical string form, eliding the port when it's
    /// the default 22 (property 1 — parse/render round-trip).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seed::SingleHost { address, port } => match port {
                Some(p) if *p != DEFAULT_PORT => write!(f, "{address}:{p}"),
                _ => write!(f, "{address}"),
            },
            Seed::Subnet(net) => write!(f, "{net}"),
        }
    }
}
