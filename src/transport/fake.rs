//! In-memory fake transport used by the crate's integration tests (spec
//! §8's scenarios) to drive the walk and introspection engines without a
//! real network, by hand-constructing scripted responses instead of
//! talking to a real device.

use std::collections::HashMap;
use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{Session, SessionCommand, Transport};
use crate::error::{Error, Result};
use crate::model::{Credential, FamilyTag};

/// A single scripted device: the family it reports, the usernames whose
/// credentials are accepted, and a fixed command -> response table.
#[derive(Clone)]
pub struct FakeDevice {
    pub family: FamilyTag,
    pub accepted_usernames: Vec<String>,
    pub responses: HashMap<String, String>,
}

impl FakeDevice {
    pub fn new(family: FamilyTag) -> Self {
        Self { family, accepted_usernames: Vec::new(), responses: HashMap::new() }
    }

    pub fn accepting(mut self, username: impl Into<String>) -> Self {
        self.accepted_usernames.push(username.into());
        self
    }

    pub fn respond(mut self, command: impl Into<String>, output: impl Into<String>) -> Self {
        self.responses.insert(command.into(), output.into());
        self
    }
}

/// A `Transport` backed entirely by a fixed address -> [`FakeDevice`] map.
/// Addresses absent from the map behave as a closed port, matching the
/// real transport's `detect_family` failure path (spec §4.8a).
#[derive(Clone, Default)]
pub struct FakeTransport {
    devices: HashMap<IpAddr, FakeDevice>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, addr: IpAddr, device: FakeDevice) -> Self {
        self.devices.insert(addr, device);
        self
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn detect_family(
        &self,
        addr: IpAddr,
        _port: u16,
        _cred: &Credential,
        _timeout: Duration,
    ) -> Result<Option<FamilyTag>> {
        Ok(self.devices.get(&addr).map(|d| d.family))
    }

    async fn connect(
        &self,
        addr: IpAddr,
        _port: u16,
        cred: &Credential,
        _family: FamilyTag,
        _timeout: Duration,
    ) -> Result<Session> {
        let device = self.devices.get(&addr).ok_or(Error::PortClosed)?;
        if !device.accepted_usernames.iter().any(|u| u == &cred.username) {
            return Err(Error::AuthFailed);
        }

        let responses = device.responses.clone();
        let (tx, mut rx) = mpsc::channel::<SessionCommand>(8);
        tokio::spawn(async move {
            while let Some(cmd) = rx.recv().await {
                match cmd {
                    SessionCommand::Send { command, reply, .. } => {
                        let out = responses.get(&command).cloned().unwrap_or_default();
                        let _ = reply.send(Ok(out));
                    }
                    SessionCommand::Close => break,
                }
            }
        });

        Ok(Session::new(tx))
    }
}
