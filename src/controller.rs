//! # Print Job Controller
//!
//! Orchestrates one submission end to end: persist the draft record,
//! then — only if persistence succeeded — compose, encode and deliver the
//! receipt. The two phases report independently: a print failure never
//! rolls back the persisted record, and a persistence failure
//! short-circuits before any transport I/O.
//!
//! The transport is owned explicitly and shared behind an async mutex, so
//! concurrent submissions serialize on the wire instead of interleaving
//! byte streams (an interleaved stream prints garbage). There is no queue
//! and no automatic retry: a failed print means the operator re-submits,
//! against a record that is already safely stored.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::compose::compose;
use crate::config::{PrintConfig, ReceiptLayout};
use crate::error::{PersistError, PrintError, TransmissionError};
use crate::protocol::Dialect;
use crate::record::{ServiceRecord, StoredRecord};
use crate::store::RecordStore;
use crate::transport::PrinterTransport;

/// A transport shared across submissions. One `send()` outstanding at a
/// time; the mutex is the serialization point.
pub type SharedTransport = Arc<Mutex<Box<dyn PrinterTransport>>>;

/// Outcome of one submission: two independent phase results.
#[derive(Debug)]
pub struct SubmitOutcome {
    /// Result of the persistence phase.
    pub persisted: Result<StoredRecord, PersistError>,
    /// Result of the print phase. `None` means printing was never
    /// attempted because persistence failed.
    pub printed: Option<Result<(), PrintError>>,
}

impl SubmitOutcome {
    /// Presentation-layer signal: clear the entry form only when the
    /// record is stored *and* the receipt came out.
    pub fn clear_draft(&self) -> bool {
        self.persisted.is_ok() && matches!(self.printed, Some(Ok(())))
    }
}

/// Orchestrator for persist-then-print submissions.
pub struct PrintJobController<S> {
    store: Arc<S>,
    transport: SharedTransport,
    layout: ReceiptLayout,
    dialect: Dialect,
    send_timeout: Option<Duration>,
}

impl<S: RecordStore> PrintJobController<S> {
    pub fn new(store: Arc<S>, transport: SharedTransport, config: &PrintConfig) -> Self {
        Self {
            store,
            transport,
            layout: config.layout.clone(),
            dialect: config.dialect,
            send_timeout: config.send_timeout_ms.map(Duration::from_millis),
        }
    }

    /// Submit a draft record: persist it, then print its receipt.
    pub async fn submit(&self, draft: ServiceRecord) -> SubmitOutcome {
        let persisted = self.store.insert(draft).await;

        let stored = match &persisted {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "persistence failed; skipping print");
                return SubmitOutcome {
                    persisted,
                    printed: None,
                };
            }
        };

        let document = compose(&stored.record, &self.layout);
        let bytes = self.dialect.encode(&document);
        let printed = self.deliver(&bytes).await;

        match &printed {
            Ok(()) => info!(id = stored.id, "record stored and receipt printed"),
            Err(e) => warn!(id = stored.id, error = %e, "record stored but receipt not printed"),
        }

        SubmitOutcome {
            persisted,
            printed: Some(printed),
        }
    }

    /// Deliver one encoded job over the shared transport.
    ///
    /// Holds the transport lock for the whole connect+send so a second
    /// submission waits for the in-flight job instead of interleaving.
    async fn deliver(&self, bytes: &[u8]) -> Result<(), PrintError> {
        let mut transport = self.transport.lock().await;

        if !transport.is_active() {
            transport.connect().await?;
        }

        match self.send_timeout {
            None => transport.send(bytes).await?,
            Some(limit) => {
                match tokio::time::timeout(limit, transport.send(bytes)).await {
                    Ok(result) => result?,
                    Err(_) => {
                        // The outstanding write cannot be cancelled; the
                        // connection must not be reused after it.
                        transport.force_disconnect();
                        return Err(TransmissionError::TimedOut.into());
                    }
                }
            }
        }

        Ok(())
    }
}
