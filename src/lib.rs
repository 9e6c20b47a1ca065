//! # Servis - Service-Desk Receipt Printing
//!
//! Servis is the intake pipeline of a small repair shop: take down a
//! service record, persist it, and hand the customer a thermal receipt.
//! The pipeline is one-way:
//!
//! ```text
//! draft record -> record store -> composer -> encoder -> transport -> printer
//! ```
//!
//! and reports two independent outcomes back: *persisted* and *printed*.
//! A record that is stored stays stored, whatever the printer does.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use rust_decimal::Decimal;
//! use servis::{
//!     config::PrintConfig,
//!     controller::PrintJobController,
//!     record::{DeviceType, ServiceRecord},
//!     store::MemoryStore,
//!     transport,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PrintConfig::default();
//!
//! // Capability-checked construction: an unsupported transport fails
//! // here, before anything touches the store.
//! let transport = transport::for_target(&config.target)?;
//! let transport = Arc::new(tokio::sync::Mutex::new(transport));
//!
//! let store = Arc::new(MemoryStore::new());
//! let controller = PrintJobController::new(store, transport, &config);
//!
//! let draft = ServiceRecord::draft(
//!     "Ana K",
//!     DeviceType::Mob,
//!     "cracked screen",
//!     "070123456",
//!     Decimal::new(2500, 2),
//! );
//! let outcome = controller.submit(draft).await;
//! println!("persisted: {}", outcome.persisted.is_ok());
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`record`] | Service records and search |
//! | [`store`] | Record store trait + memory/JSON-file stores |
//! | [`compose`] | Record → receipt document (pure) |
//! | [`document`] | Receipt document and directives |
//! | [`protocol`] | ESC/POS subset encoder/decoder |
//! | [`transport`] | Bridge, serial and mock delivery backends |
//! | [`controller`] | Persist-then-print orchestration |
//! | [`config`] | Printer target, layout text, timeouts |
//! | [`error`] | Error taxonomy |

pub mod compose;
pub mod config;
pub mod controller;
pub mod document;
pub mod error;
pub mod protocol;
pub mod record;
pub mod store;
pub mod transport;

// Re-exports for convenience
pub use config::{PrintConfig, PrinterTarget};
pub use controller::{PrintJobController, SubmitOutcome};
pub use error::{
    ConnectionError, PersistError, PrintError, TransmissionError, UnsupportedTransportError,
};
pub use record::{DeviceType, ServiceRecord, StoredRecord};
pub use transport::PrinterTransport;
