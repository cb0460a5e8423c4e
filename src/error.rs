//! Crate-wide error type.
//!
//! Mirrors the error kinds a discovery job can surface: malformed input at
//! submit time, transport failures per device, and the handful of internal
//! conditions that should never abort a whole job (see `Device::discovery_error`).

use thiserror::Error;

/// Result alias used throughout the core.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed seed, bad exclusion regex, or bad job_id at submit time.
    #[error("bad input: {0}")]
    BadInput(String),

    /// TCP port never opened.
    #[error("port closed")]
    PortClosed,

    /// An operation exceeded its deadline.
    #[error("timed out")]
    Timeout,

    /// Every credential in the try-loop was rejected.
    #[error("authentication failed")]
    AuthFailed,

    /// The transport connected but the device protocol misbehaved.
    #[error("protocol error: {0}")]
    ProtocolError(String),

    /// A parser could not extract a field. Non-fatal; callers treat this as `None`.
    #[error("parse miss: {0}")]
    ParseMiss(String),

    /// The job's overall deadline expired and in-flight work was cancelled.
    #[error("cancelled")]
    Cancelled,

    /// Anything else — logged and demoted to a per-device failure, never fatal to the job.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind::*;
        match err.kind() {
            TimedOut => Error::Timeout,
            ConnectionRefused => Error::PortClosed,
            _ => Error::Internal(err.to_string()),
        }
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::BadInput(format!("invalid exclusion pattern: {err}"))
    }
}

impl From<std::net::AddrParseError> for Error {
    fn from(err: std::net::AddrParseError) -> Self {
        Error::BadInput(format!("invalid address: {err}"))
    }
}

impl From<ipnetwork::IpNetworkError> for Error {
    fn from(err: ipnetwork::IpNetworkError) -> Self {
        Error::BadInput(format!("invalid network: {err}"))
    }
}

impl From<tokio::time::error::Elapsed> for Error {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Error::Timeout
    }
}
