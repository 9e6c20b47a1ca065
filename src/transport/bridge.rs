//! # Bridge Transport
//!
//! Delivers print jobs through the local print-spool agent: a long-lived
//! companion process that owns the system's registered printers and
//! multiplexes jobs to them over a persistent websocket.
//!
//! ## Agent Protocol
//!
//! - **Handshake**: open a websocket to the agent endpoint, then announce
//!   the target printer with a text frame `{"open": "<printer name>"}`.
//!   The agent replies `ok` once the printer is claimed.
//! - **Job**: one binary frame per job, containing the raw ESC/POS bytes.
//!   The agent replies `ok` when the spooler has accepted the job, or
//!   `err <reason>` when it refused it.
//!
//! The connection is reused across jobs: the controller checks
//! `is_active()` and only reconnects when the session is gone. A refused
//! or failed job drops the session back to `Disconnected` — the next
//! submission reconnects explicitly.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use super::{ConnectionState, PrinterTransport};
use crate::error::{ConnectionError, TransmissionError};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Transport via the local print-spool agent.
pub struct BridgeTransport {
    url: String,
    printer: String,
    state: ConnectionState,
    socket: Option<Socket>,
}

impl BridgeTransport {
    /// Create an unconnected bridge transport. No I/O happens here.
    pub fn new(url: String, printer: String) -> Self {
        Self {
            url,
            printer,
            state: ConnectionState::Disconnected,
            socket: None,
        }
    }

    /// Wait for the agent's reply to the last frame we sent.
    async fn await_ack(socket: &mut Socket) -> Result<(), String> {
        loop {
            match socket.next().await {
                Some(Ok(Message::Text(reply))) => {
                    let reply = reply.trim();
                    if reply == "ok" {
                        return Ok(());
                    }
                    return Err(reply.to_string());
                }
                // Keepalive traffic is not an answer; keep waiting.
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                Some(Ok(Message::Close(_))) | None => {
                    return Err("agent closed the connection".to_string())
                }
                Some(Ok(other)) => {
                    return Err(format!("unexpected frame from agent: {:?}", other))
                }
                Some(Err(e)) => return Err(e.to_string()),
            }
        }
    }
}

#[async_trait::async_trait]
impl PrinterTransport for BridgeTransport {
    fn is_active(&self) -> bool {
        matches!(
            self.state,
            ConnectionState::Connected | ConnectionState::Sending
        ) && self.socket.is_some()
    }

    fn state(&self) -> ConnectionState {
        self.state
    }

    async fn connect(&mut self) -> Result<(), ConnectionError> {
        if self.state == ConnectionState::Closed {
            return Err(ConnectionError::Closed);
        }
        if self.is_active() {
            return Ok(());
        }

        self.state = ConnectionState::Connecting;
        debug!(url = %self.url, "connecting to print-spool agent");

        let (mut socket, _) = connect_async(&self.url).await.map_err(|e| {
            self.state = ConnectionState::Disconnected;
            ConnectionError::Handshake(format!("{}: {}", self.url, e))
        })?;

        // Claim the printer as part of the handshake.
        let open = format!(r#"{{"open": "{}"}}"#, self.printer);
        let handshake = async {
            socket
                .send(Message::Text(open))
                .await
                .map_err(|e| e.to_string())?;
            Self::await_ack(&mut socket).await
        }
        .await;

        if let Err(reason) = handshake {
            self.state = ConnectionState::Disconnected;
            return Err(ConnectionError::Handshake(format!(
                "agent refused printer '{}': {}",
                self.printer, reason
            )));
        }

        info!(printer = %self.printer, "bridge session established");
        self.socket = Some(socket);
        self.state = ConnectionState::Connected;
        Ok(())
    }

    async fn send(&mut self, bytes: &[u8]) -> Result<(), TransmissionError> {
        if self.state == ConnectionState::Closed {
            return Err(ConnectionError::Closed.into());
        }
        if !self.is_active() {
            // Never silently connect mid-send.
            return Err(ConnectionError::NotConnected.into());
        }
        self.state = ConnectionState::Sending;
        debug!(len = bytes.len(), "sending job to agent");
        let socket = self
            .socket
            .as_mut()
            .ok_or(TransmissionError::Connection(ConnectionError::NotConnected))?;

        let outcome = async {
            socket
                .send(Message::Binary(bytes.to_vec()))
                .await
                .map_err(|e| TransmissionError::WriteFailed(e.to_string()))?;
            Self::await_ack(socket)
                .await
                .map_err(TransmissionError::NoAck)
        }
        .await;

        match outcome {
            Ok(()) => {
                self.state = ConnectionState::Connected;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "bridge send failed; dropping session");
                self.socket = None;
                self.state = ConnectionState::Disconnected;
                Err(e)
            }
        }
    }

    async fn close(&mut self) {
        if let Some(mut socket) = self.socket.take() {
            // Best effort; the state goes to Closed regardless.
            let _ = socket.close(None).await;
        }
        self.state = ConnectionState::Closed;
    }

    fn force_disconnect(&mut self) {
        if self.state != ConnectionState::Closed {
            self.socket = None;
            self.state = ConnectionState::Disconnected;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport() -> BridgeTransport {
        BridgeTransport::new("ws://127.0.0.1:8182".to_string(), "Tysso".to_string())
    }

    #[tokio::test]
    async fn test_send_without_connection_is_connection_error() {
        let mut t = transport();
        assert!(!t.is_active());
        let err = t.send(b"\x1B\x40").await.unwrap_err();
        assert!(matches!(
            err,
            TransmissionError::Connection(ConnectionError::NotConnected)
        ));
        // The failed send must not have connected anything.
        assert!(!t.is_active());
    }

    #[tokio::test]
    async fn test_closed_is_terminal() {
        let mut t = transport();
        t.close().await;
        assert_eq!(t.state(), ConnectionState::Closed);
        assert!(matches!(
            t.connect().await.unwrap_err(),
            ConnectionError::Closed
        ));
        assert!(matches!(
            t.send(b"x").await.unwrap_err(),
            TransmissionError::Connection(ConnectionError::Closed)
        ));
    }

    #[tokio::test]
    async fn test_force_disconnect_does_not_close() {
        let mut t = transport();
        t.force_disconnect();
        assert_eq!(t.state(), ConnectionState::Disconnected);
    }
}
