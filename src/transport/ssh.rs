//! SSH-backed transport (spec §4.3), built on `ssh2`.
//!
//! Blocking libssh2 calls run on a dedicated thread and talk back to the
//! async caller over channels, since a session handle can't safely cross
//! an `.await` point.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use ssh2::Session as Ssh2Session;
use tokio::sync::{mpsc, oneshot};

use super::{Session, SessionCommand, Transport};
use crate::error::{Error, Result};
use crate::model::{AuthType, Credential, FamilyTag};

pub struct SshTransport;

impl SshTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SshTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for SshTransport {
    async fn detect_family(
        &self,
        addr: std::net::IpAddr,
        port: u16,
        cred: &Credential,
        timeout: Duration,
    ) -> Result<Option<FamilyTag>> {
        let cred = cred.clone();
        let result = tokio::task::spawn_blocking(move || detect_family_blocking(addr, port, &cred, timeout))
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;
        result
    }

    async fn connect(
        &self,
        addr: std::net::IpAddr,
        port: u16,
        cred: &Credential,
        family: FamilyTag,
        timeout: Duration,
    ) -> Result<Session> {
        let (tx, rx) = mpsc::channel::<SessionCommand>(8);
        let (ready_tx, ready_rx) = oneshot::channel::<Result<()>>();

        let cred = cred.clone();
        std::thread::spawn(move || session_worker(addr, port, cred, family, timeout, rx, ready_tx));

        ready_rx
            .await
            .map_err(|_| Error::ProtocolError("session worker vanished during connect".into()))??;

        Ok(Session::new(tx))
    }
}

fn detect_family_blocking(
    addr: std::net::IpAddr,
    port: u16,
    cred: &Credential,
    timeout: Duration,
) -> Result<Option<FamilyTag>> {
    let tcp = dial(addr, port, timeout)?;
    let mut sess = Ssh2Session::new().map_err(|e| Error::ProtocolError(e.to_string()))?;
    sess.set_tcp_stream(tcp);
    sess.set_timeout(timeout.as_millis() as u32);
    sess.handshake().map_err(|e| classify_ssh_error(&e))?;

    let banner = sess.banner().unwrap_or_default().to_lowercase();
    if let Some(tag) = family_from_banner(&banner) {
        return Ok(Some(tag));
    }

    authenticate(&mut sess, cred)?;
    let probe = run_once(&sess, "show version", Duration::from_secs(5)).unwrap_or_default();
    let _ = &sess; // session outlives the channel borrow above
    Ok(family_from_banner(&probe.to_lowercase()))
}

fn family_from_banner(text: &str) -> Option<FamilyTag> {
    if text.contains("nx-os") || text.contains("nxos") {
        Some(FamilyTag::Nxos)
    } else if text.contains("junos") {
        Some(FamilyTag::Junos)
    } else if text.contains("arista") || text.contains("eos") {
        Some(FamilyTag::Eos)
    } else if text.contains("ios-xe") || text.contains("ios xe") {
        Some(FamilyTag::IosXe)
    } else if text.contains("cisco") || text.contains("ios") {
        Some(FamilyTag::GenericIos)
    } else {
        None
    }
}

fn dial(addr: std::net::IpAddr, port: u16, timeout: Duration) -> Result<TcpStream> {
    let socket = SocketAddr::new(addr, port);
    TcpStream::connect_timeout(&socket, timeout).map_err(|e| match e.kind() {
        std::io::ErrorKind::ConnectionRefused => Error::PortClosed,
        std::io::ErrorKind::TimedOut => Error::Timeout,
        _ => Error::ProtocolError(e.to_string()),
    })
}

fn classify_ssh_error(err: &ssh2::Error) -> Error {
    match err.code() {
        ssh2::ErrorCode::Session(-18) | ssh2::ErrorCode::Session(-19) => Error::AuthFailed,
        _ => Error::ProtocolError(err.to_string()),
    }
}

fn authenticate(sess: &mut Ssh2Session, cred: &Credential) -> Result<()> {
    match cred.auth_type {
        AuthType::Password | AuthType::Token => {
            sess.userauth_password(&cred.username, &cred.password)
                .map_err(|_| Error::AuthFailed)?;
        }
        AuthType::Key => {
            // `password` carries the private key path for key-based auth in
            // this transport; a production deployment would pass a parsed
            // key material struct instead of overloading the field.
            sess.userauth_pubkey_file(&cred.username, None, std::path::Path::new(&cred.password), None)
                .map_err(|_| Error::AuthFailed)?;
        }
    }
    if !sess.authenticated() {
        return Err(Error::AuthFailed);
    }
    Ok(())
}

/// Run a single command over a fresh exec channel (used only for family
/// detection, which doesn't need the long-lived interactive shell).
fn run_once(sess: &Ssh2Session, command: &str, timeout: Duration) -> Result<String> {
    let mut channel = sess.channel_session().map_err(|e| Error::ProtocolError(e.to_string()))?;
    channel.exec(command).map_err(|e| Error::ProtocolError(e.to_string()))?;
    let mut out = String::new();
    read_until_quiet(sess, &mut channel, &mut out, timeout)?;
    let _ = channel.close();
    Ok(out)
}

/// Reads from an SSH channel until no new bytes arrive for a short quiet
/// window, or `timeout` elapses — a pragmatic stand-in for detecting a
/// device's CLI prompt without knowing its exact string in advance.
///
/// Puts the owning session into non-blocking mode for the duration of the
/// read loop; `ssh2::Channel`'s `Read` impl surfaces `LIBSSH2_ERROR_EAGAIN`
/// as `io::ErrorKind::WouldBlock`, which is what drives the quiet-window
/// detection below.
fn read_until_quiet(sess: &Ssh2Session, channel: &mut ssh2::Channel, out: &mut String, timeout: Duration) -> Result<()> {
    sess.set_blocking(false);
    let result = read_until_quiet_inner(channel, out, timeout);
    sess.set_blocking(true);
    result
}

fn read_until_quiet_inner(channel: &mut ssh2::Channel, out: &mut String, timeout: Duration) -> Result<()> {
    let deadline = Instant::now() + timeout;
    let quiet_window = Duration::from_millis(300);
    let mut buf = [0u8; 4096];
    let mut last_read = Instant::now();
    loop {
        if Instant::now() >= deadline {
            return Err(Error::Timeout);
        }
        match channel.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                out.push_str(&String::from_utf8_lossy(&buf[..n]));
                last_read = Instant::now();
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                if last_read.elapsed() >= quiet_window && !out.is_empty() {
                    break;
                }
            }
            Err(e) => return Err(Error::ProtocolError(e.to_string())),
        }
        if channel.eof() {
            break;
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn session_worker(
    addr: std::net::IpAddr,
    port: u16,
    cred: Credential,
    _family: FamilyTag,
    timeout: Duration,
    mut rx: mpsc::Receiver<SessionCommand>,
    ready_tx: oneshot::Sender<Result<()>>,
) {
    let setup = (|| -> Result<(Ssh2Session, ssh2::Channel)> {
        let tcp = dial(addr, port, timeout)?;
        let mut sess = Ssh2Session::new().map_err(|e| Error::ProtocolError(e.to_string()))?;
        sess.set_tcp_stream(tcp);
        sess.set_timeout(timeout.as_millis() as u32);
        sess.handshake().map_err(|e| classify_ssh_error(&e))?;
        authenticate(&mut sess, &cred)?;
        let mut channel = sess.channel_session().map_err(|e| Error::ProtocolError(e.to_string()))?;
        channel.shell().map_err(|e| Error::ProtocolError(e.to_string()))?;
        Ok((sess, channel))
    })();

    let (sess, mut channel) = match setup {
        Ok(pair) => {
            let _ = ready_tx.send(Ok(()));
            pair
        }
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return;
        }
    };
    let _keep_alive = sess;

    while let Some(cmd) = rx.blocking_recv() {
        match cmd {
            SessionCommand::Send { command, timeout, reply } => {
                let result = (|| -> Result<String> {
                    writeln!(channel, "{command}").map_err(|e| Error::ProtocolError(e.to_string()))?;
                    let mut out = String::new();
                    read_until_quiet(&sess, &mut channel, &mut out, timeout)?;
                    Ok(out)
                })();
                let _ = reply.send(result);
            }
            SessionCommand::Close => break,
        }
    }
    let _ = channel.close();
}
