//! # Error Types
//!
//! Failure taxonomy for the print-job pipeline.
//!
//! The composer and encoder are total functions and have no error types.
//! Everything that can fail lives in persistence ([`PersistError`]) or
//! transport I/O ([`ConnectionError`], [`TransmissionError`],
//! [`UnsupportedTransportError`]). Errors are surfaced verbatim to the
//! caller; no layer retries on its own.

use thiserror::Error;

/// Persistence failures reported by a record store.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The store could not be reached (network down, file missing, ...).
    #[error("record store unreachable: {0}")]
    Unreachable(String),

    /// The record violates a store constraint.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// Underlying I/O failure while reading or writing the store.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The store's on-disk content could not be (de)serialized.
    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Connection-phase failures: the transport never reached `Connected`.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The handshake with the print-spool agent failed.
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// The device or endpoint could not be opened.
    #[error("cannot open {device}: {reason}")]
    Device { device: String, reason: String },

    /// The platform denied access to the device.
    #[error("permission denied opening {0}")]
    PermissionDenied(String),

    /// Another process holds exclusive access to the port.
    #[error("device busy: {0}")]
    Busy(String),

    /// `send()` was called without an active connection.
    #[error("transport is not connected")]
    NotConnected,

    /// The transport was closed; a new instance must be constructed.
    #[error("transport is closed")]
    Closed,
}

/// Transmission-phase failures: the connection was up, the write was not.
#[derive(Debug, Error)]
pub enum TransmissionError {
    /// The write itself failed mid-send.
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// The bridge agent rejected the job or never acknowledged it.
    #[error("no acknowledgement from print agent: {0}")]
    NoAck(String),

    /// A caller-imposed timeout expired while the send was outstanding.
    #[error("send timed out")]
    TimedOut,

    /// The connection was not in a sendable state.
    ///
    /// Sending on an inactive transport is a connection-level fault, not a
    /// write fault; the inner error says why.
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

/// A requested transport capability is absent in the host environment.
///
/// Produced by the capability-checked transport factory at construction
/// time, never inside the send path.
#[derive(Debug, Error)]
#[error("transport '{kind}' is not supported on this host: {reason}")]
pub struct UnsupportedTransportError {
    /// Transport kind that was requested (e.g. "serial").
    pub kind: &'static str,
    /// Why the host cannot provide it.
    pub reason: String,
}

/// Any failure in the print phase of a submission.
///
/// Persistence failures are deliberately *not* part of this type: the two
/// phases report independently so a caller can distinguish "record saved,
/// receipt not printed" from "nothing saved".
#[derive(Debug, Error)]
pub enum PrintError {
    #[error(transparent)]
    Unsupported(#[from] UnsupportedTransportError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Transmission(#[from] TransmissionError),
}

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}
