//! Transport layer: open a request/response shell session to a device
//! (spec §4.3).
//!
//! `Session` is a thin, cloneable handle to a conversation running on a
//! dedicated OS thread — `ssh2::Session` is not safely movable across an
//! `.await` point, so [`transport::ssh::SshTransport`](ssh::SshTransport)
//! drives the actual libssh2 calls on a blocking thread and talks to it over
//! channels, a worker-thread boundary chosen because SSH sessions are
//! stateful and long-lived, unlike a one-shot UDP round trip.

pub mod fake;
pub mod ssh;

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::error::{Error, Result};
use crate::model::{Credential, FamilyTag};

#[async_trait]
pub trait Transport: Send + Sync {
    /// Attempt a banner probe and/or a limited command probe to select a
    /// family tag. May return a best guess on ambiguity (spec §4.3).
    async fn detect_family(
        &self,
        addr: IpAddr,
        port: u16,
        cred: &Credential,
        timeout: Duration,
    ) -> Result<Option<FamilyTag>>;

    /// Open a session. Fails with `PortClosed`, `Timeout`, `AuthFailed`, or
    /// `ProtocolError` depending on where the connection attempt broke down.
    async fn connect(
        &self,
        addr: IpAddr,
        port: u16,
        cred: &Credential,
        family: FamilyTag,
        timeout: Duration,
    ) -> Result<Session>;
}

enum SessionCommand {
    Send {
        command: String,
        timeout: Duration,
        reply: oneshot::Sender<Result<String>>,
    },
    Close,
}

/// A live session handle. Dropping it without calling [`Session::close`]
/// still tears down the worker thread once the channel closes.
pub struct Session {
    tx: mpsc::Sender<SessionCommand>,
}

impl Session {
    pub(crate) fn new(tx: mpsc::Sender<SessionCommand>) -> Self {
        Self { tx }
    }

    /// Send a command and read the response, bounded by `timeout`
    /// (spec §4.3, §5 — every `send` has its own deadline).
    pub async fn send(&self, command: &str, timeout: Duration) -> Result<String> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(SessionCommand::Send {
                command: command.to_string(),
                timeout,
                reply: reply_tx,
            })
            .await
            .map_err(|_| Error::ProtocolError("session worker gone".into()))?;
        reply_rx
            .await
            .map_err(|_| Error::ProtocolError("session worker dropped reply".into()))?
    }

    pub async fn close(self) {
        let _ = self.tx.send(SessionCommand::Close).await;
    }
}
