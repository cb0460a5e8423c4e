//! TCP port probing (spec §4.2).

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use serde::Serialize;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PortState {
    Open,
    Closed,
    Filtered,
}

/// Probe a single `(ip, port)` within `timeout`.
///
/// A completed three-way handshake is `Open`. A connection refusal is
/// `Closed`. Any timeout or unreachable error is `Filtered`. The probe
/// socket is always closed on both branches — `TcpStream`'s `Drop` handles
/// that for us once the connect future resolves or is dropped.
///
/// SSH (port 22) gets special treatment: a peer that completes the TCP
/// handshake but immediately resets the connection with a protocol-level
/// error still counts as `Open` — we only classify by the handshake outcome,
/// never by what happens to the byte stream afterward (see spec §9 open
/// question: this crate's policy is "TCP accept wins", independent of port).
pub async fn probe(ip: IpAddr, port: u16, timeout: Duration) -> PortState {
    let addr = SocketAddr::new(ip, port);
    match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(mut stream)) => {
            // Drain a banner opportunistically; irrelevant to classification but
            // avoids leaving data in the socket buffer for very chatty peers.
            let mut buf = [0u8; 1];
            let _ = tokio::time::timeout(Duration::from_millis(50), stream.read(&mut buf)).await;
            PortState::Open
        }
        Ok(Err(e)) => {
            if e.kind() == std::io::ErrorKind::ConnectionRefused {
                PortState::Closed
            } else {
                PortState::Filtered
            }
        }
        Err(_) => PortState::Filtered,
    }
}
