//! # Printer Transport Layer
//!
//! Delivery backends for sending encoded receipts to a physical printer.
//!
//! ## Available Transports
//!
//! - [`bridge`]: persistent websocket to the local print-spool agent
//! - [`serial`]: direct exclusive serial/USB device handle (Unix)
//! - [`mock`]: in-memory transport for tests and `--dry-run`
//!
//! ## Lifecycle
//!
//! Every transport walks the same state machine:
//!
//! ```text
//! Disconnected --connect()--> Connecting --ok--> Connected
//!                                  |                 |
//!                                fail           send() -> Sending
//!                                  v                 |    ok -> Connected
//!                             Disconnected <---- fail
//!
//! Connected/Disconnected --close()--> Closed   (terminal)
//! ```
//!
//! A failed send drops the transport back to `Disconnected`; nothing
//! reconnects automatically. Retry policy belongs to the caller. `Closed`
//! is terminal: construct a new instance to reconnect.
//!
//! A transport instance is one process-wide connection to one target;
//! callers serialize `send()` calls (the controller holds the instance
//! behind a mutex) so two jobs never interleave on the wire.

pub mod bridge;
pub mod mock;
#[cfg(unix)]
pub mod serial;

pub use bridge::BridgeTransport;
pub use mock::MockTransport;
#[cfg(unix)]
pub use serial::SerialTransport;

use async_trait::async_trait;
use std::fmt;

use crate::config::PrinterTarget;
use crate::error::{ConnectionError, TransmissionError, UnsupportedTransportError};

/// Connection lifecycle state of a transport instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    /// A write is outstanding. Transient; resolves to `Connected` or
    /// `Disconnected`.
    Sending,
    /// Terminal. A new instance must be constructed to reconnect.
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Sending => "sending",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Capability interface for delivering bytes to a printer.
#[async_trait]
pub trait PrinterTransport: Send {
    /// Whether the transport currently holds an open connection.
    fn is_active(&self) -> bool;

    /// Current lifecycle state.
    fn state(&self) -> ConnectionState;

    /// Open the connection; resolves when the handshake completes or fails.
    async fn connect(&mut self) -> Result<(), ConnectionError>;

    /// Deliver one job; resolves when the device/agent has taken the bytes.
    ///
    /// Fails with [`TransmissionError::Connection`] if called without an
    /// active connection — transports never connect implicitly mid-send.
    async fn send(&mut self, bytes: &[u8]) -> Result<(), TransmissionError>;

    /// Close the connection. Terminal; the instance cannot reconnect.
    async fn close(&mut self);

    /// Force the state machine to `Disconnected`, dropping any connection.
    ///
    /// Used by callers whose external send timeout expired: the outstanding
    /// write cannot be cancelled, but the connection must not be reused.
    fn force_disconnect(&mut self);
}

/// Construct the transport for a configured target.
///
/// Capability checks happen here, at construction time — never inside the
/// send path. Requesting a serial target on a host without serial support
/// fails fast with [`UnsupportedTransportError`].
pub fn for_target(
    target: &PrinterTarget,
) -> Result<Box<dyn PrinterTransport>, UnsupportedTransportError> {
    match target {
        PrinterTarget::Bridge { url, printer } => {
            Ok(Box::new(BridgeTransport::new(url.clone(), printer.clone())))
        }
        #[cfg(unix)]
        PrinterTarget::Serial { device } => Ok(Box::new(SerialTransport::new(device.clone()))),
        #[cfg(not(unix))]
        PrinterTarget::Serial { .. } => Err(UnsupportedTransportError {
            kind: "serial",
            reason: "direct serial device access requires a Unix host".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_builds_bridge() {
        let target = PrinterTarget::Bridge {
            url: "ws://127.0.0.1:8182".to_string(),
            printer: "Tysso".to_string(),
        };
        let transport = for_target(&target).unwrap();
        assert_eq!(transport.state(), ConnectionState::Disconnected);
        assert!(!transport.is_active());
    }

    #[cfg(unix)]
    #[test]
    fn test_factory_builds_serial_on_unix() {
        let target = PrinterTarget::Serial {
            device: "/dev/ttyUSB0".to_string(),
        };
        let transport = for_target(&target).unwrap();
        assert_eq!(transport.state(), ConnectionState::Disconnected);
    }
}
