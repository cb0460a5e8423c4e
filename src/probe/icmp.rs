//! ICMP liveness probing (spec §4.2).
//!
//! One echo request per host within a 1-2s window, run concurrently and
//! bounded by the shared probe semaphore. Never raises on a per-host
//! failure — an unreachable host simply doesn't appear in the result set.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use surge_ping::{Client, Config, PingIdentifier, PingSequence, ICMP};
use tokio::sync::Semaphore;

/// Runs one echo request per target, bounded by `concurrency`. Returns the
/// subset that answered within `timeout`.
pub async fn scan(targets: &[IpAddr], timeout: Duration, concurrency: Arc<Semaphore>) -> Vec<IpAddr> {
    let v4_client = Client::new(&Config::default()).ok();
    let v6_client = Client::new(&Config::builder().kind(ICMP::V6).build()).ok();

    let mut tasks = Vec::with_capacity(targets.len());
    for &target in targets {
        let permit = concurrency.clone();
        let client = match target {
            IpAddr::V4(_) => v4_client.clone(),
            IpAddr::V6(_) => v6_client.clone(),
        };
        tasks.push(tokio::spawn(async move {
            let _permit = permit.acquire_owned().await.ok()?;
            let client = client?;
            ping_once(&client, target, timeout).await.then_some(target)
        }));
    }

    let mut reachable = Vec::new();
    for task in tasks {
        if let Ok(Some(ip)) = task.await {
            reachable.push(ip);
        }
    }
    reachable
}

async fn ping_once(client: &Client, target: IpAddr, timeout: Duration) -> bool {
    let payload = [0u8; 8];
    let mut pinger = client
        .pinger(target, PingIdentifier(std::process::id() as u16))
        .await;
    tokio::time::timeout(timeout, pinger.ping(PingSequence(0), &payload))
        .await
        .map(|r| r.is_ok())
        .unwrap_or(false)
}
