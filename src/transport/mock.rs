//! # Mock Transport
//!
//! In-memory transport implementing the full state machine without any
//! hardware. Backs the test suite and the CLI's `--dry-run` mode: jobs
//! are captured instead of printed, and failures can be injected per
//! phase.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{ConnectionState, PrinterTransport};
use crate::error::{ConnectionError, TransmissionError};

/// What the mock observed, in order. `SendStart`/`SendEnd` pairs let
/// tests assert that two jobs never overlapped on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEvent {
    Connect,
    SendStart,
    SendEnd,
    Close,
}

#[derive(Default)]
struct Shared {
    jobs: Mutex<Vec<Vec<u8>>>,
    events: Mutex<Vec<MockEvent>>,
}

/// Capturing transport for tests and dry runs.
pub struct MockTransport {
    state: ConnectionState,
    shared: Arc<Shared>,
    /// Artificial per-send delay, to widen race windows in tests.
    send_delay: Option<Duration>,
    fail_connect: Arc<AtomicBool>,
    fail_next_send: Arc<AtomicBool>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            shared: Arc::new(Shared::default()),
            send_delay: None,
            fail_connect: Arc::new(AtomicBool::new(false)),
            fail_next_send: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle for inspecting captured jobs/events after the transport has
    /// been moved into a controller.
    pub fn probe(&self) -> MockProbe {
        MockProbe {
            shared: self.shared.clone(),
            fail_connect: self.fail_connect.clone(),
            fail_next_send: self.fail_next_send.clone(),
        }
    }

    /// Sleep this long inside every `send()`.
    pub fn with_send_delay(mut self, delay: Duration) -> Self {
        self.send_delay = Some(delay);
        self
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

/// Inspection/injection handle paired with a [`MockTransport`].
#[derive(Clone)]
pub struct MockProbe {
    shared: Arc<Shared>,
    fail_connect: Arc<AtomicBool>,
    fail_next_send: Arc<AtomicBool>,
}

impl MockProbe {
    /// Captured jobs, one byte vector per completed `send()`.
    pub fn jobs(&self) -> Vec<Vec<u8>> {
        self.shared.jobs.lock().expect("mock lock").clone()
    }

    /// Observed lifecycle events, in order.
    pub fn events(&self) -> Vec<MockEvent> {
        self.shared.events.lock().expect("mock lock").clone()
    }

    /// Make every following `connect()` fail.
    pub fn fail_connect(&self, fail: bool) {
        self.fail_connect.store(fail, Ordering::SeqCst);
    }

    /// Make the next `send()` fail with a write error.
    pub fn fail_next_send(&self) {
        self.fail_next_send.store(true, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl PrinterTransport for MockTransport {
    fn is_active(&self) -> bool {
        matches!(
            self.state,
            ConnectionState::Connected | ConnectionState::Sending
        )
    }

    fn state(&self) -> ConnectionState {
        self.state
    }

    async fn connect(&mut self) -> Result<(), ConnectionError> {
        if self.state == ConnectionState::Closed {
            return Err(ConnectionError::Closed);
        }
        self.state = ConnectionState::Connecting;
        if self.fail_connect.load(Ordering::SeqCst) {
            self.state = ConnectionState::Disconnected;
            return Err(ConnectionError::Handshake("mock connect refused".to_string()));
        }
        self.shared
            .events
            .lock()
            .expect("mock lock")
            .push(MockEvent::Connect);
        self.state = ConnectionState::Connected;
        Ok(())
    }

    async fn send(&mut self, bytes: &[u8]) -> Result<(), TransmissionError> {
        if self.state == ConnectionState::Closed {
            return Err(ConnectionError::Closed.into());
        }
        if !self.is_active() {
            return Err(ConnectionError::NotConnected.into());
        }
        self.state = ConnectionState::Sending;
        self.shared
            .events
            .lock()
            .expect("mock lock")
            .push(MockEvent::SendStart);

        if let Some(delay) = self.send_delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_next_send.swap(false, Ordering::SeqCst) {
            self.state = ConnectionState::Disconnected;
            return Err(TransmissionError::WriteFailed(
                "mock write refused".to_string(),
            ));
        }

        let mut events = self.shared.events.lock().expect("mock lock");
        events.push(MockEvent::SendEnd);
        drop(events);
        self.shared
            .jobs
            .lock()
            .expect("mock lock")
            .push(bytes.to_vec());
        self.state = ConnectionState::Connected;
        Ok(())
    }

    async fn close(&mut self) {
        self.shared
            .events
            .lock()
            .expect("mock lock")
            .push(MockEvent::Close);
        self.state = ConnectionState::Closed;
    }

    fn force_disconnect(&mut self) {
        if self.state != ConnectionState::Closed {
            self.state = ConnectionState::Disconnected;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_walks_the_state_machine() {
        let mut t = MockTransport::new();
        let probe = t.probe();

        assert_eq!(t.state(), ConnectionState::Disconnected);
        t.connect().await.unwrap();
        assert_eq!(t.state(), ConnectionState::Connected);
        t.send(b"job").await.unwrap();
        assert_eq!(t.state(), ConnectionState::Connected);
        t.close().await;
        assert_eq!(t.state(), ConnectionState::Closed);

        assert_eq!(probe.jobs(), vec![b"job".to_vec()]);
        assert_eq!(
            probe.events(),
            vec![
                MockEvent::Connect,
                MockEvent::SendStart,
                MockEvent::SendEnd,
                MockEvent::Close
            ]
        );
    }

    #[tokio::test]
    async fn test_send_failure_disconnects() {
        let mut t = MockTransport::new();
        let probe = t.probe();
        t.connect().await.unwrap();
        probe.fail_next_send();

        let err = t.send(b"job").await.unwrap_err();
        assert!(matches!(err, TransmissionError::WriteFailed(_)));
        assert_eq!(t.state(), ConnectionState::Disconnected);
        assert!(probe.jobs().is_empty());

        // No auto-reconnect: the next send fails until connect() is called.
        assert!(t.send(b"job").await.is_err());
        t.connect().await.unwrap();
        t.send(b"job").await.unwrap();
        assert_eq!(probe.jobs().len(), 1);
    }
}
